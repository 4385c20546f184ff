//! Scaling parameter validation.

use serde::Deserialize;
use zcp_common::AutoscalingParams;

use crate::domain::error::{ErrorCode, ZcpError};

pub const CPU_MODES: &[&str] = &["SHARED", "DEDICATED"];

/// Requested scaling. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleParams {
    pub cpu_mode: Option<String>,
    pub min_cpu: Option<i32>,
    pub max_cpu: Option<i32>,
    pub min_ram: Option<f64>,
    pub max_ram: Option<f64>,
    pub min_disk: Option<f64>,
    pub max_disk: Option<f64>,
    pub start_cpu: Option<i32>,
    pub min_containers: Option<i32>,
    pub max_containers: Option<i32>,
}

impl ScaleParams {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Checks the request before any API call.
    ///
    /// # Errors
    ///
    /// `INVALID_SCALING` when nothing is set, the CPU mode is unknown or a
    /// minimum exceeds its maximum.
    pub fn validate(&self) -> Result<(), ZcpError> {
        if self.is_empty() {
            return Err(ZcpError::new(
                ErrorCode::InvalidScaling,
                "At least one scaling parameter must be provided",
                "Provide cpuMode, minCpu/maxCpu, minRam/maxRam, minDisk/maxDisk, startCpu, or minContainers/maxContainers",
            ));
        }
        if let Some(mode) = &self.cpu_mode
            && !CPU_MODES.contains(&mode.as_str())
        {
            return Err(ZcpError::new(
                ErrorCode::InvalidScaling,
                format!("Invalid cpuMode '{mode}'"),
                "Use SHARED or DEDICATED",
            ));
        }
        check_range("Cpu", self.min_cpu, self.max_cpu)?;
        check_range("Ram", self.min_ram, self.max_ram)?;
        check_range("Disk", self.min_disk, self.max_disk)?;
        check_range("Containers", self.min_containers, self.max_containers)?;
        Ok(())
    }

    /// Platform request carrying only the fields that were set.
    #[must_use]
    pub fn to_autoscaling(&self, service_mode: &str) -> AutoscalingParams {
        AutoscalingParams {
            service_mode: service_mode.to_string(),
            horizontal_min_count: self.min_containers,
            horizontal_max_count: self.max_containers,
            vertical_cpu_mode: self.cpu_mode.clone(),
            vertical_start_cpu: self.start_cpu,
            vertical_min_cpu: self.min_cpu,
            vertical_max_cpu: self.max_cpu,
            vertical_min_ram: self.min_ram,
            vertical_max_ram: self.max_ram,
            vertical_min_disk: self.min_disk,
            vertical_max_disk: self.max_disk,
        }
    }
}

fn check_range<T: PartialOrd>(what: &str, min: Option<T>, max: Option<T>) -> Result<(), ZcpError> {
    match (min, max) {
        (Some(lo), Some(hi)) if lo > hi => Err(ZcpError::new(
            ErrorCode::InvalidScaling,
            format!("min{what} must be <= max{what}"),
            format!("Lower min{what} or raise max{what}"),
        )),
        _ => Ok(()),
    }
}
