//! Tests for `pincho send` argument parsing.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;

#[test]
fn cli_parse_send_minimal() {
    match parse(&["pincho", "send", "Hello"]) {
        CliCommand::Send {
            title,
            message,
            tags,
            token,
            timeout,
            max_retries,
            ..
        } => {
            assert_eq!(title, "Hello");
            assert!(message.is_none());
            assert!(tags.is_empty());
            assert!(token.is_none());
            assert!(timeout.is_none());
            assert!(max_retries.is_none());
        }
        _ => panic!("expected Send"),
    }
}

#[test]
fn cli_parse_send_full() {
    match parse(&[
        "pincho",
        "send",
        "Server Alert",
        "CPU at 95%",
        "-t",
        "alert",
        "--tag",
        "prod",
        "--tag",
        "web",
        "--image-url",
        "https://example.com/a.png",
        "--action-url",
        "https://example.com",
        "--encrypt-password",
        "pw",
        "--api-url",
        "http://127.0.0.1:8080/send",
        "--timeout",
        "5",
        "--max-retries",
        "0",
        "--token",
        "abc12345",
    ]) {
        CliCommand::Send {
            title,
            message,
            kind,
            tags,
            image_url,
            action_url,
            encrypt_password,
            token,
            api_url,
            timeout,
            max_retries,
        } => {
            assert_eq!(title, "Server Alert");
            assert_eq!(message.as_deref(), Some("CPU at 95%"));
            assert_eq!(kind.as_deref(), Some("alert"));
            assert_eq!(tags, vec!["prod", "web"]);
            assert_eq!(image_url.as_deref(), Some("https://example.com/a.png"));
            assert_eq!(action_url.as_deref(), Some("https://example.com"));
            assert_eq!(encrypt_password.as_deref(), Some("pw"));
            assert_eq!(token.as_deref(), Some("abc12345"));
            assert_eq!(api_url.as_deref(), Some("http://127.0.0.1:8080/send"));
            assert_eq!(timeout, Some(5));
            assert_eq!(max_retries, Some(0));
        }
        _ => panic!("expected Send"),
    }
}

#[test]
fn cli_send_requires_title() {
    assert!(Cli::try_parse_from(["pincho", "send"]).is_err());
}

#[test]
fn cli_send_rejects_zero_timeout() {
    assert!(Cli::try_parse_from(["pincho", "send", "t", "--timeout", "0"]).is_err());
}

#[test]
fn cli_send_rejects_negative_retries() {
    assert!(Cli::try_parse_from(["pincho", "send", "t", "--max-retries", "-1"]).is_err());
}
