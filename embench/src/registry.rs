//! Names of the evaluated environments.
use embench_core::error::EmbenchError;
use std::{fmt, path::PathBuf, str::FromStr};

/// Environment names known to the harness.
pub const ENV_NAMES: [&str; 5] = ["eb-alf", "eb-hab", "eb-nav", "eb-man", "eb-teach"];

/// Environments provided by this build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvKind {
    /// TEACh execution-from-dialog-history tasks.
    Teach,
}

impl EnvKind {
    /// The registered name.
    pub fn name(&self) -> &'static str {
        match self {
            EnvKind::Teach => "eb-teach",
        }
    }

    /// Directory under the results root.
    pub fn result_dir_name(&self) -> &'static str {
        match self {
            EnvKind::Teach => "eb_teach",
        }
    }

    /// Base configuration file, `configs/<name>.yaml`.
    pub fn config_path(&self) -> PathBuf {
        PathBuf::from("configs").join(format!("{}.yaml", self.name()))
    }
}

impl fmt::Display for EnvKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for EnvKind {
    type Err = EmbenchError;

    /// Registered names not provided by this build are reported as
    /// [`EmbenchError::UnsupportedEnv`], other names as
    /// [`EmbenchError::UnknownEnv`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eb-teach" => Ok(EnvKind::Teach),
            _ if ENV_NAMES.contains(&s) => Err(EmbenchError::UnsupportedEnv(s.to_string())),
            _ => Err(EmbenchError::UnknownEnv(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_names() {
        assert_eq!("eb-teach".parse::<EnvKind>().unwrap(), EnvKind::Teach);
        for name in ["eb-alf", "eb-hab", "eb-nav", "eb-man"].iter() {
            assert!(matches!(
                name.parse::<EnvKind>(),
                Err(EmbenchError::UnsupportedEnv(_))
            ));
        }
        assert!(matches!(
            "eb-foo".parse::<EnvKind>(),
            Err(EmbenchError::UnknownEnv(_))
        ));
        assert_eq!(
            EnvKind::Teach.config_path(),
            PathBuf::from("configs/eb-teach.yaml")
        );
    }
}
