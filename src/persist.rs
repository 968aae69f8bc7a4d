//! Versioned binary model format.
//!
//! A blob is the 4-byte magic `TSTM` followed by a Postcard encoding of
//! [`Payload`]. The enum discriminant is the format version: new versions
//! add variants instead of changing existing ones, so older readers reject
//! newer blobs instead of misreading them.
//!
//! The payload carries the hyperparameters, label mapping, feature count,
//! seed, every automaton state with its clause polarity, and every random
//! stream. Encoding is deterministic, so export -> import -> export is
//! byte-identical, and an imported model keeps training exactly as the
//! exported one would have.

use serde::{Deserialize, Serialize};

use crate::{
    Clause, Config, TsetlinMachine,
    classifier::Fitted,
    error::{Error, Result},
    machine::ClassModel,
    utils::FastRng
};

/// Leading bytes of every model blob.
pub const MAGIC: &[u8; 4] = b"TSTM";

/// Version-tagged payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Payload {
    V1(ModelV1)
}

/// Version 1 payload structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelV1 {
    pub config:     Config,
    /// Sorted distinct labels; position = class index.
    pub classes:    Vec<i64>,
    pub n_features: u64,
    pub seed:       u64,
    /// Stream used for shuffling and negative-class sampling.
    pub master:     FastRng,
    /// One entry per class, in class-index order.
    pub models:     Vec<ClassPayload>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassPayload {
    pub clauses: Vec<ClausePayload>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClausePayload {
    pub polarity: i8,
    /// Automaton states, literal order x_0, NOT x_0, x_1, ...
    pub states:   Vec<i32>,
    pub stream:   FastRng
}

/// # Overview
///
/// Encodes a fitted model.
pub(crate) fn to_bytes(fitted: &Fitted) -> Result<Vec<u8>> {
    let machine = &fitted.machine;
    let models = machine
        .classes
        .iter()
        .map(|model| ClassPayload {
            clauses: model
                .clauses
                .iter()
                .zip(&model.streams)
                .map(|(clause, stream)| ClausePayload {
                    polarity: clause.polarity(),
                    states:   clause.states(),
                    stream:   stream.clone()
                })
                .collect()
        })
        .collect();

    let payload = Payload::V1(ModelV1 {
        config: machine.config,
        classes: fitted.classes.clone(),
        n_features: machine.n_features as u64,
        seed: machine.seed,
        master: machine.master.clone(),
        models
    });

    let mut out = MAGIC.to_vec();
    out.extend(postcard::to_allocvec(&payload)?);
    log::debug!(
        "exported model: {} classes, {} clauses, {} bytes",
        machine.n_classes(),
        machine.clause_count(),
        out.len()
    );
    Ok(out)
}

/// # Overview
///
/// Decodes and validates a blob produced by [`to_bytes`].
///
/// Rejects wrong magic, unknown versions, trailing bytes, invalid
/// hyperparameters, unsorted or duplicate labels, and clause data that does
/// not match the configured shape.
pub(crate) fn from_bytes(bytes: &[u8]) -> Result<Fitted> {
    let body = bytes.strip_prefix(MAGIC.as_slice()).ok_or(Error::BadMagic)?;
    let (payload, rest): (Payload, &[u8]) = postcard::take_from_bytes(body)?;
    if !rest.is_empty() {
        return Err(Error::Corrupt(format!("{} trailing bytes", rest.len())));
    }

    let Payload::V1(model) = payload;
    let fitted = restore_v1(model)?;
    log::debug!(
        "imported model: {} classes, {} features",
        fitted.classes.len(),
        fitted.machine.n_features
    );
    Ok(fitted)
}

fn restore_v1(model: ModelV1) -> Result<Fitted> {
    let config = model.config;
    config.validate()?;

    if model.classes.len() < 2 || model.classes.windows(2).any(|w| w[0] >= w[1]) {
        return Err(Error::Corrupt("labels must be at least 2, sorted and distinct".into()));
    }
    if model.models.len() != model.classes.len() {
        return Err(Error::Corrupt(format!(
            "{} labels but {} class models",
            model.classes.len(),
            model.models.len()
        )));
    }
    let n_features = usize::try_from(model.n_features)
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| Error::Corrupt(format!("bad feature count {}", model.n_features)))?;

    let per_class = config.clauses_per_class();
    let mut classes = Vec::with_capacity(model.models.len());
    for (class_idx, class) in model.models.into_iter().enumerate() {
        if class.clauses.len() != per_class {
            return Err(Error::Corrupt(format!(
                "class {class_idx} has {} clauses, expected {per_class}",
                class.clauses.len()
            )));
        }
        let mut clauses = Vec::with_capacity(per_class);
        let mut streams = Vec::with_capacity(per_class);
        for (j, payload) in class.clauses.into_iter().enumerate() {
            let expected = if j % 2 == 0 { 1 } else { -1 };
            let clause = Clause::from_states(&payload.states, config.number_of_states, payload.polarity)
                .filter(|c| c.polarity() == expected && c.n_features() == n_features)
                .ok_or_else(|| Error::Corrupt(format!("class {class_idx} clause {j} is malformed")))?;
            clauses.push(clause);
            streams.push(payload.stream);
        }
        classes.push(ClassModel {
            clauses,
            streams
        });
    }

    let machine = TsetlinMachine {
        config,
        n_features,
        seed: model.seed,
        classes,
        master: model.master
    };
    Ok(Fitted::new(model.classes, machine))
}
