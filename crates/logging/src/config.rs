//! crates/logging/src/config.rs
//! Verbosity configuration combining info and debug levels.

use super::levels::{DebugFlag, DebugLevels, InfoFlag, InfoLevels};

/// Combined verbosity configuration for info and debug flags.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerbosityConfig {
    /// Info flag levels.
    pub info: InfoLevels,
    /// Debug flag levels.
    pub debug: DebugLevels,
}

impl VerbosityConfig {
    /// Create a new configuration from a verbose level (0-3).
    ///
    /// Level 0 only reports fallback handoffs, level 1 adds connection and
    /// delivery summaries, level 2 enables selector/probe/push-back debugging
    /// and level 3 or above raises everything including pool tracing.
    pub fn from_verbose_level(level: u8) -> Self {
        let mut config = Self::default();

        match level {
            0 => {
                config.info.fallback = 1;
            }
            1 => {
                config.info.set_all(1);
            }
            2 => {
                config.info.set_all(1);
                config.debug.select = 1;
                config.debug.probe = 1;
                config.debug.pushback = 1;
            }
            _ => {
                config.info.set_all(2);
                config.debug.select = 2;
                config.debug.probe = 2;
                config.debug.pushback = 2;
                config.debug.pool = 1;
            }
        }

        config
    }

    /// Apply a single info flag token (e.g., "fallback", "deliver2").
    pub fn apply_info_flag(&mut self, token: &str) -> Result<(), String> {
        let (name, level) = parse_flag_token(token)?;

        if name == "all" {
            self.info.set_all(level);
            return Ok(());
        }

        let flag = InfoFlag::ALL
            .into_iter()
            .find(|flag| flag.name() == name)
            .ok_or_else(|| format!("unknown info flag: {name}"))?;

        self.info.set(flag, level);
        Ok(())
    }

    /// Apply a single debug flag token (e.g., "probe2", "select").
    pub fn apply_debug_flag(&mut self, token: &str) -> Result<(), String> {
        let (name, level) = parse_flag_token(token)?;

        if name == "all" {
            self.debug.set_all(level);
            return Ok(());
        }

        let flag = DebugFlag::ALL
            .into_iter()
            .find(|flag| flag.name() == name)
            .ok_or_else(|| format!("unknown debug flag: {name}"))?;

        self.debug.set(flag, level);
        Ok(())
    }

    /// Apply a comma separated list of debug tokens, stopping at the first error.
    pub fn apply_debug_list(&mut self, list: &str) -> Result<(), String> {
        list.split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .try_for_each(|token| self.apply_debug_flag(token))
    }
}

/// Parse a flag token like "probe2" into ("probe", 2) or "select" into ("select", 1).
fn parse_flag_token(token: &str) -> Result<(&str, u8), String> {
    if token.is_empty() {
        return Err("empty flag token".to_string());
    }

    let digit_start = token.find(|c: char| c.is_ascii_digit());

    match digit_start {
        Some(0) => Err(format!("flag token has no name: {token}")),
        Some(pos) => {
            let name = &token[..pos];
            let level = token[pos..]
                .parse::<u8>()
                .map_err(|_| format!("invalid level in flag: {token}"))?;
            Ok((name, level))
        }
        None => Ok((token, 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_level_zero_only_reports_fallback() {
        let config = VerbosityConfig::from_verbose_level(0);

        assert_eq!(config.info.fallback, 1);
        assert_eq!(config.info.connect, 0);
        assert_eq!(config.info.deliver, 0);
        assert_eq!(config.debug, DebugLevels::default());
    }

    #[test]
    fn verbose_level_two_enables_engine_debugging() {
        let config = VerbosityConfig::from_verbose_level(2);

        assert_eq!(config.info.connect, 1);
        assert_eq!(config.debug.select, 1);
        assert_eq!(config.debug.probe, 1);
        assert_eq!(config.debug.pushback, 1);
        assert_eq!(config.debug.pool, 0);
    }

    #[test]
    fn verbose_levels_above_three_saturate() {
        assert_eq!(
            VerbosityConfig::from_verbose_level(3),
            VerbosityConfig::from_verbose_level(9)
        );
    }

    #[test]
    fn test_parse_flag_token() {
        assert_eq!(parse_flag_token("probe").unwrap(), ("probe", 1));
        assert_eq!(parse_flag_token("probe2").unwrap(), ("probe", 2));
        assert_eq!(parse_flag_token("pool10").unwrap(), ("pool", 10));
        assert!(parse_flag_token("").is_err());
        assert!(parse_flag_token("3").is_err());
        assert!(parse_flag_token("probe999").is_err());
    }

    #[test]
    fn apply_info_flag_sets_level() {
        let mut config = VerbosityConfig::default();

        config.apply_info_flag("deliver").unwrap();
        assert_eq!(config.info.deliver, 1);

        config.apply_info_flag("deliver2").unwrap();
        assert_eq!(config.info.deliver, 2);

        assert!(config.apply_info_flag("copy").is_err());
    }

    #[test]
    fn apply_debug_flag_all_sets_every_flag() {
        let mut config = VerbosityConfig::default();
        config.apply_debug_flag("all2").unwrap();

        for flag in DebugFlag::ALL {
            assert_eq!(config.debug.get(flag), 2);
        }
    }

    #[test]
    fn apply_debug_list_parses_each_token() {
        let mut config = VerbosityConfig::default();
        config.apply_debug_list("select, probe2,,pool").unwrap();

        assert_eq!(config.debug.select, 1);
        assert_eq!(config.debug.probe, 2);
        assert_eq!(config.debug.pool, 1);
        assert_eq!(config.debug.pushback, 0);
    }

    #[test]
    fn apply_debug_list_reports_unknown_token() {
        let mut config = VerbosityConfig::default();
        let err = config.apply_debug_list("select,bogus").unwrap_err();
        assert!(err.contains("bogus"));
        assert_eq!(config.debug.select, 1);
    }
}
