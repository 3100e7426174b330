// ABOUTME: Targeting modes understood by the salt master (expr_form).
// ABOUTME: Controls how the tgt selector is matched against minions.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unknown target type: '{0}' (expected one of glob, pcre, list, grain, grain_pcre, pillar, pillar_pcre, nodegroup, range, compound, ipcidr)")]
pub struct TargetTypeError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    Glob,
    Pcre,
    List,
    Grain,
    GrainPcre,
    Pillar,
    PillarPcre,
    Nodegroup,
    Range,
    Compound,
    Ipcidr,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Glob => "glob",
            TargetType::Pcre => "pcre",
            TargetType::List => "list",
            TargetType::Grain => "grain",
            TargetType::GrainPcre => "grain_pcre",
            TargetType::Pillar => "pillar",
            TargetType::PillarPcre => "pillar_pcre",
            TargetType::Nodegroup => "nodegroup",
            TargetType::Range => "range",
            TargetType::Compound => "compound",
            TargetType::Ipcidr => "ipcidr",
        }
    }
}

impl FromStr for TargetType {
    type Err = TargetTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "glob" => Ok(TargetType::Glob),
            "pcre" => Ok(TargetType::Pcre),
            "list" => Ok(TargetType::List),
            "grain" => Ok(TargetType::Grain),
            "grain_pcre" => Ok(TargetType::GrainPcre),
            "pillar" => Ok(TargetType::Pillar),
            "pillar_pcre" => Ok(TargetType::PillarPcre),
            "nodegroup" => Ok(TargetType::Nodegroup),
            "range" => Ok(TargetType::Range),
            "compound" => Ok(TargetType::Compound),
            "ipcidr" => Ok(TargetType::Ipcidr),
            _ => Err(TargetTypeError(s.to_string())),
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
