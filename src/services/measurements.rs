// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Body measurement log for a student's progress view.

use crate::error::AppError;
use crate::models::MeasurementRecord;
use crate::units;

/// Ordered list of measurement records. Records are kept sorted by date;
/// records on the same date keep insertion order.
#[derive(Debug, Default, Clone)]
pub struct MeasurementLog {
    records: Vec<MeasurementRecord>,
    next_id: u64,
}

impl MeasurementLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record and return its assigned id.
    pub fn add(&mut self, mut record: MeasurementRecord) -> Result<String, AppError> {
        validate(&record)?;
        self.next_id += 1;
        record.id = self.next_id.to_string();
        let id = record.id.clone();

        let pos = self.records.partition_point(|r| r.date <= record.date);
        self.records.insert(pos, record);
        tracing::debug!(id = %id, "Measurement added");
        Ok(id)
    }

    /// Replace the record with `id`, keeping the id.
    pub fn update(&mut self, id: &str, mut record: MeasurementRecord) -> Result<(), AppError> {
        validate(&record)?;
        let index = self.index_of(id)?;
        self.records.remove(index);
        record.id = id.to_string();
        let pos = self.records.partition_point(|r| r.date <= record.date);
        self.records.insert(pos, record);
        Ok(())
    }

    /// Remove the record with `id`.
    pub fn remove(&mut self, id: &str) -> Result<MeasurementRecord, AppError> {
        let index = self.index_of(id)?;
        Ok(self.records.remove(index))
    }

    pub fn records(&self) -> &[MeasurementRecord] {
        &self.records
    }

    pub fn latest(&self) -> Option<&MeasurementRecord> {
        self.records.last()
    }

    /// Weight change from the first to the latest record, in kg.
    pub fn weight_change(&self) -> Option<f64> {
        let first = self.records.first()?;
        let last = self.records.last()?;
        Some(units::round2(last.weight - first.weight))
    }

    fn index_of(&self, id: &str) -> Result<usize, AppError> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| AppError::Validation(format!("Medida {} não encontrada", id)))
    }
}

/// Date is guaranteed by the type; weight must be positive and in bounds,
/// and every optional measure must be positive.
fn validate(record: &MeasurementRecord) -> Result<(), AppError> {
    if record.weight <= 0.0 {
        return Err(AppError::Validation("Data e peso são obrigatórios.".to_string()));
    }
    units::validate_weight(record.weight)?;

    let optional = [
        record.height,
        record.chest,
        record.waist,
        record.hips,
        record.arms,
        record.thighs,
        record.neck,
        record.shoulders,
    ];
    if optional
        .iter()
        .flatten()
        .any(|v| !v.is_finite() || *v <= 0.0)
    {
        return Err(AppError::Validation("Medidas devem ser positivas.".to_string()));
    }
    Ok(())
}
