//! Offset correction for confirmed anomalies.
//!
//! Both passes are left folds over ascending readings. The only state is an
//! [`OffsetState`] created fresh for each call: per-field running offsets,
//! threaded from one step to the next.

use mc_common::{AnomalySet, FieldId, FieldMap, Reading, ResetDates};

use crate::logging::event_names;

/// Per-field running offsets for one correction pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OffsetState {
    offsets: FieldMap,
}

impl OffsetState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset currently in effect for a field (0 if none).
    pub fn offset(&self, field: &FieldId) -> f64 {
        self.offsets.get(field).copied().unwrap_or(0.0)
    }

    pub fn offsets(&self) -> &FieldMap {
        &self.offsets
    }

    /// One reset-correction step.
    ///
    /// `previous` is the raw and corrected form of the preceding reading,
    /// `None` for the first one. On a confirmed date, every field that
    /// dropped against the raw previous value takes the previous corrected
    /// value as its new offset, so repeated resets stack.
    pub fn step_reset(
        mut self,
        previous: Option<(&Reading, &Reading)>,
        current: &Reading,
        confirmed: &ResetDates,
    ) -> (Self, Reading) {
        if let Some((raw_before, corrected_before)) = previous {
            if confirmed.contains(current.timestamp) {
                for (field, &value) in &current.fields {
                    if value < raw_before.value(field) {
                        let offset = corrected_before.value(field);
                        tracing::debug!(
                            target: event_names::CORRECT_OFFSET_APPLIED,
                            timestamp = %current.timestamp,
                            field = %field,
                            offset,
                            "reset offset"
                        );
                        self.offsets.insert(field.clone(), offset);
                    }
                }
            }
        }

        let fields = current
            .fields
            .iter()
            .map(|(field, &value)| (field.clone(), value + self.offset(field)))
            .collect();

        (self, Reading::new(current.timestamp, fields))
    }

    /// One spike-correction step.
    ///
    /// A raw value below the running offset means the offset is stale (the
    /// register was replaced or restarted since the spike), so the offset is
    /// dropped and the raw value passes through. A confirmed spike then adds
    /// its raw value to the offset. Output is `max(0, raw - offset)`.
    pub fn step_spike(mut self, current: &Reading, confirmed: &AnomalySet) -> (Self, Reading) {
        let mut fields = FieldMap::new();

        for (field, &raw) in &current.fields {
            let mut offset = self.offset(field);

            if raw < offset {
                tracing::debug!(
                    target: event_names::CORRECT_OFFSET_HEALED,
                    timestamp = %current.timestamp,
                    field = %field,
                    raw,
                    stale_offset = offset,
                    "offset reset"
                );
                offset = 0.0;
                self.offsets.remove(field);
            }

            if confirmed.contains(current.timestamp, field) {
                offset += raw;
                tracing::debug!(
                    target: event_names::CORRECT_OFFSET_APPLIED,
                    timestamp = %current.timestamp,
                    field = %field,
                    offset,
                    "spike offset"
                );
                self.offsets.insert(field.clone(), offset);
            }

            fields.insert(field.clone(), (raw - offset).max(0.0));
        }

        (self, Reading::new(current.timestamp, fields))
    }
}

/// Apply confirmed meter resets as running offsets.
///
/// Corrected values continue from where the replaced register left off.
/// An empty confirmation set returns the input unchanged.
pub fn correct_resets(readings: &[Reading], confirmed: &ResetDates) -> Vec<Reading> {
    if confirmed.is_empty() {
        return readings.to_vec();
    }

    let (_, corrected) = readings.iter().enumerate().fold(
        (OffsetState::new(), Vec::<Reading>::with_capacity(readings.len())),
        |(state, mut out), (i, current)| {
            let previous = i
                .checked_sub(1)
                .map(|j| (&readings[j], &out[j]));
            let (state, reading) = state.step_reset(previous, current, confirmed);
            out.push(reading);
            (state, out)
        },
    );

    corrected
}

/// Remove confirmed new-field spikes from the cumulative series.
///
/// An empty confirmation set returns the input unchanged.
pub fn correct_spikes(readings: &[Reading], confirmed: &AnomalySet) -> Vec<Reading> {
    if confirmed.is_empty() {
        return readings.to_vec();
    }

    let (_, corrected) = readings.iter().fold(
        (OffsetState::new(), Vec::<Reading>::with_capacity(readings.len())),
        |(state, mut out), current| {
            let (state, reading) = state.step_spike(current, confirmed);
            out.push(reading);
            (state, out)
        },
    );

    corrected
}
