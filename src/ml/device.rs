// ============================================================
// Layer 5 — Precision and Device Placement
// ============================================================
// Parses the two load-time options:
//
//   precision: "bf16" | "f16" | "f32"          → candle DType
//   device:    "auto" | "cpu" | "cuda[:N]" | "metal[:N]"
//
// "auto" picks the first accelerator that is present: CUDA
// device 0, then Metal device 0, then the CPU.

use anyhow::{bail, Context, Result};
use candle_core::{
    utils::{cuda_is_available, metal_is_available},
    DType, Device,
};
use std::str::FromStr;

pub fn parse_precision(s: &str) -> Result<DType> {
    match s.trim().to_ascii_lowercase().as_str() {
        "bf16" | "bfloat16"         => Ok(DType::BF16),
        "f16" | "fp16" | "float16"  => Ok(DType::F16),
        "f32" | "fp32" | "float32"  => Ok(DType::F32),
        other => bail!("Unknown precision '{other}' (expected bf16, f16 or f32)"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevicePolicy {
    Auto,
    Cpu,
    Cuda(usize),
    Metal(usize),
}

impl FromStr for DevicePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        let (kind, ordinal) = match s.split_once(':') {
            Some((kind, n)) => {
                let n = n.parse::<usize>()
                    .with_context(|| format!("Invalid device ordinal in '{s}'"))?;
                (kind.to_string(), Some(n))
            }
            None => (s.clone(), None),
        };

        match (kind.as_str(), ordinal) {
            ("auto", None)  => Ok(Self::Auto),
            ("cpu", None)   => Ok(Self::Cpu),
            ("cuda", n)     => Ok(Self::Cuda(n.unwrap_or(0))),
            ("metal", n)    => Ok(Self::Metal(n.unwrap_or(0))),
            _ => bail!("Unknown device '{s}' (expected auto, cpu, cuda[:N] or metal[:N])"),
        }
    }
}

impl DevicePolicy {
    /// Materialise the candle device
    pub fn select(&self) -> Result<Device> {
        let device = match self {
            Self::Auto if cuda_is_available()  => Device::new_cuda(0)?,
            Self::Auto if metal_is_available() => Device::new_metal(0)?,
            Self::Auto | Self::Cpu             => Device::Cpu,
            Self::Cuda(n)  => Device::new_cuda(*n)
                .with_context(|| format!("CUDA device {n} is not available"))?,
            Self::Metal(n) => Device::new_metal(*n)
                .with_context(|| format!("Metal device {n} is not available"))?,
        };
        Ok(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_precision() {
        assert_eq!(parse_precision("bf16").unwrap(), DType::BF16);
        assert_eq!(parse_precision("BFloat16").unwrap(), DType::BF16);
        assert_eq!(parse_precision("fp16").unwrap(), DType::F16);
        assert_eq!(parse_precision("f32").unwrap(), DType::F32);
        assert!(parse_precision("int4").is_err());
    }

    #[test]
    fn test_parse_device() {
        assert_eq!("auto".parse::<DevicePolicy>().unwrap(), DevicePolicy::Auto);
        assert_eq!("CPU".parse::<DevicePolicy>().unwrap(), DevicePolicy::Cpu);
        assert_eq!("cuda".parse::<DevicePolicy>().unwrap(), DevicePolicy::Cuda(0));
        assert_eq!("cuda:1".parse::<DevicePolicy>().unwrap(), DevicePolicy::Cuda(1));
        assert_eq!("metal:0".parse::<DevicePolicy>().unwrap(), DevicePolicy::Metal(0));
        assert!("tpu".parse::<DevicePolicy>().is_err());
        assert!("cpu:1".parse::<DevicePolicy>().is_err());
        assert!("cuda:x".parse::<DevicePolicy>().is_err());
    }

    #[test]
    fn test_cpu_always_selectable() {
        assert!(DevicePolicy::Cpu.select().unwrap().is_cpu());
    }
}
