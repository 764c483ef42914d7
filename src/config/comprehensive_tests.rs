//! Additional tests for configuration parsing and validation

use super::{ConfigParser, ConfigValidator, EnvManager};
use crate::{cli::Cli, defaults, models::Config};
use clap::Parser;
use proptest::prelude::*;
use std::collections::HashMap;

fn lookup(pairs: Vec<(&'static str, String)>) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<&'static str, String> = pairs.into_iter().collect();
    move |key| map.get(key).cloned()
}

/// Boundary values accepted and rejected by the hard limits
mod config_edge_cases {
    use super::*;

    #[test]
    fn test_maximum_values() {
        let config = Config {
            clients: defaults::MAX_CLIENTS,
            duration_seconds: defaults::MAX_DURATION_SECS,
            msg_size: defaults::MAX_MSG_SIZE,
            reply_timeout_seconds: defaults::MAX_TIMEOUT_SECS,
            connect_timeout_seconds: defaults::MAX_TIMEOUT_SECS,
            rate: defaults::MAX_RATE,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_just_over_the_limits() {
        let cases = [
            Config { clients: defaults::MAX_CLIENTS + 1, ..Default::default() },
            Config { duration_seconds: defaults::MAX_DURATION_SECS + 1, ..Default::default() },
            Config { msg_size: defaults::MAX_MSG_SIZE + 1, ..Default::default() },
            Config { reply_timeout_seconds: defaults::MAX_TIMEOUT_SECS + 1, ..Default::default() },
            Config { rate: defaults::MAX_RATE * 2.0, ..Default::default() },
            Config { rate: defaults::MIN_RATE / 2.0, ..Default::default() },
            Config { rate: f64::NAN, ..Default::default() },
            Config { rate: f64::INFINITY, ..Default::default() },
        ];

        for config in cases {
            assert!(config.validate().is_err(), "accepted {:?}", config);
        }
    }

    #[test]
    fn test_ipv6_and_hostnames() {
        for host in ["::1", "fe80::1", "chat.internal", "10.1.2.3"] {
            let config = Config {
                host: host.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "{}", host);
        }
    }
}

/// Environment parsing details
mod env_parsing_tests {
    use super::*;

    #[test]
    fn test_whitespace_is_trimmed() {
        let mut config = Config::default();
        config
            .merge_from_lookup(lookup(vec![
                ("CHAT_BENCH_CLIENTS", " 12 ".to_string()),
                ("CHAT_BENCH_HOST", " chat.local ".to_string()),
            ]))
            .unwrap();
        assert_eq!(config.clients, 12);
        assert_eq!(config.host, "chat.local");
    }

    #[test]
    fn test_boolean_values_are_case_sensitive() {
        assert!(EnvManager::validate_env_var("CHAT_BENCH_ENABLE_COLOR", "true").is_ok());
        assert!(EnvManager::validate_env_var("CHAT_BENCH_ENABLE_COLOR", "false").is_ok());

        for value in ["TRUE", "True", "yes", "1", "0"] {
            assert!(
                EnvManager::validate_env_var("CHAT_BENCH_ENABLE_COLOR", value).is_err(),
                "accepted {}",
                value
            );
        }
    }

    #[test]
    fn test_pacing_aliases() {
        for value in ["schedule", "scheduled", "fixed-delay", "fixed_delay", "delay", " Schedule "] {
            assert!(EnvManager::validate_env_var("CHAT_BENCH_PACING", value).is_ok(), "{}", value);
        }
    }
}

/// defaults < environment < CLI
mod config_priority_tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        let cli = Cli::parse_from(["chat-bench", "--rate", "3"]);
        let config = ConfigParser::new(cli)
            .parse_with_lookup(lookup(vec![
                ("CHAT_BENCH_RATE", "2".to_string()),
                ("CHAT_BENCH_MSG_SIZE", "8".to_string()),
            ]))
            .unwrap();

        assert_eq!(config.rate, 3.0);
        assert_eq!(config.msg_size, 8);
        assert_eq!(config.clients, defaults::DEFAULT_CLIENTS);
    }
}

/// Test error message quality and helpfulness
mod error_message_tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_variable_and_value() {
        let err = EnvManager::validate_env_var("CHAT_BENCH_PORT", "http").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("CHAT_BENCH_PORT"));
        assert!(msg.contains("http"));

        let err = EnvManager::validate_env_var("CHAT_BENCH_DURATION", "0").unwrap_err();
        assert!(err.to_string().contains("between 1 and 86400"));
    }

    #[test]
    fn test_hard_errors_win_over_warnings() {
        let config = Config {
            clients: 0,
            ..Default::default()
        };
        let err = ConfigValidator::validate_comprehensive(&config).unwrap_err();
        assert!(err.to_string().contains("Client count"));
    }
}

mod property_tests {
    use super::*;

    proptest! {
        /// Any in-range value written to the environment lands in the config
        #[test]
        fn env_values_round_trip(
            clients in 1usize..=defaults::MAX_CLIENTS,
            duration in 1u64..=defaults::MAX_DURATION_SECS,
            msg_size in 0usize..=defaults::MAX_MSG_SIZE,
            port in 1u16..=u16::MAX,
        ) {
            let mut config = Config::default();
            config.merge_from_lookup(lookup(vec![
                ("CHAT_BENCH_CLIENTS", clients.to_string()),
                ("CHAT_BENCH_DURATION", duration.to_string()),
                ("CHAT_BENCH_MSG_SIZE", msg_size.to_string()),
                ("CHAT_BENCH_PORT", port.to_string()),
            ])).unwrap();

            prop_assert_eq!(config.clients, clients);
            prop_assert_eq!(config.duration_seconds, duration);
            prop_assert_eq!(config.msg_size, msg_size);
            prop_assert_eq!(config.port, port);
            prop_assert!(config.validate().is_ok());
        }

        /// A flag always beats the variable for the same setting
        #[test]
        fn cli_beats_environment(flag in 1usize..1000, env in 1usize..1000) {
            let cli = Cli::parse_from(["chat-bench".to_string(), "--clients".to_string(), flag.to_string()]);
            let config = ConfigParser::new(cli)
                .parse_with_lookup(lookup(vec![("CHAT_BENCH_CLIENTS", env.to_string())]))
                .unwrap();
            prop_assert_eq!(config.clients, flag);
        }

        /// Advisory checks never fail on a configuration the hard limits accept
        #[test]
        fn warnings_never_error(
            clients in 1usize..5000,
            rate in 0.001f64..1000.0,
            duration in 1u64..600,
            reply in 1u64..=300,
        ) {
            let config = Config {
                clients,
                rate,
                duration_seconds: duration,
                reply_timeout_seconds: reply,
                ..Default::default()
            };
            prop_assert!(ConfigValidator::validate_comprehensive(&config).is_ok());
        }
    }
}

/// Test concurrent configuration operations
mod concurrency_tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_validation() {
        let handles: Vec<_> = (0..10usize)
            .map(|i| {
                thread::spawn(move || {
                    let config = Config {
                        clients: i + 1,
                        rate: (i + 1) as f64 / 2.0,
                        reply_timeout_seconds: (i % 5 + 1) as u64,
                        ..Default::default()
                    };
                    assert!(config.validate().is_ok());
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
