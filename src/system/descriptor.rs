// src/system/descriptor.rs

use crate::system::{error::ExecutionError, tokenizer};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    static ref ENV_ASSIGNMENT_RE: Regex =
        Regex::new(r"^\s*([a-zA-Z_0-9]+)\s*=\s*(\S+)\s*$").expect("valid env assignment regex");
}

/// The parsed form of a command line: leading environment assignments, the program
/// and its arguments.
///
/// A descriptor is built fresh for every invocation and never mutated afterwards.
/// An empty [`executable`](Self::executable) is representable on purpose so that
/// "nothing to run" can be reported with the raw input instead of failing at spawn.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandDescriptor {
    environment: Vec<String>,
    executable: String,
    arguments: Vec<String>,
}

impl CommandDescriptor {
    /// Tokenizes every input with shell rules then partitions the words.
    ///
    /// # Errors
    /// Fails only when an input has unterminated quoting.
    pub fn parse<S: AsRef<str>>(inputs: &[S]) -> Result<Self, ExecutionError> {
        let tokens = tokenizer::split_all(inputs)?;
        Ok(Self::from_tokens(tokens))
    }

    /// Partitions already tokenized words.
    ///
    /// `KEY=VALUE` words are environment assignments until the first word that is not
    /// one. That word is the executable and everything after it is an argument, even
    /// words that look like assignments.
    pub fn from_tokens<I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut environment = Vec::new();
        let mut command: Vec<String> = Vec::new();

        for token in tokens {
            if command.is_empty() {
                if let Some(caps) = ENV_ASSIGNMENT_RE.captures(&token) {
                    let (_, [key, value]) = caps.extract();
                    environment.push(format!("{key}={value}"));
                    continue;
                }
            }
            command.push(token);
        }

        let mut command = command.into_iter();
        Self {
            environment,
            executable: command.next().unwrap_or_default(),
            arguments: command.collect(),
        }
    }

    /// Environment assignments, normalized to `KEY=VALUE`, in input order.
    pub fn environment(&self) -> &[String] {
        &self.environment
    }

    /// Environment assignments split into key and value. Later duplicates win when
    /// applied in order.
    pub fn env_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.environment
            .iter()
            .filter_map(|assignment| assignment.split_once('='))
    }

    /// Program name or path; empty when the input held no command.
    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Arguments passed verbatim.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// `true` when there is no program to run.
    pub fn is_empty(&self) -> bool {
        self.executable.is_empty()
    }
}

impl fmt::Display for CommandDescriptor {
    /// Renders `env... executable args...` separated by single spaces, verbatim.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .environment
            .iter()
            .map(String::as_str)
            .chain((!self.executable.is_empty()).then_some(self.executable.as_str()))
            .chain(self.arguments.iter().map(String::as_str));

        for (i, part) in parts.enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(part)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn assert_descriptor(input: &str, executable: &str, arguments: &[&str], environment: &[&str]) {
        let descriptor = CommandDescriptor::parse(&[input]).unwrap();
        assert_eq!(descriptor.executable(), executable, "executable of `{input}`");
        assert_eq!(descriptor.arguments(), items(arguments), "arguments of `{input}`");
        assert_eq!(descriptor.environment(), items(environment), "environment of `{input}`");
    }

    #[test]
    fn test_command_only() {
        assert_descriptor("bash", "bash", &[], &[]);
    }

    #[test]
    fn test_env_forms() {
        assert_descriptor("A=1 bash", "bash", &[], &["A=1"]);
        assert_descriptor(r#"A="1" bash"#, "bash", &[], &["A=1"]);
        assert_descriptor(r#""A=1" bash"#, "bash", &[], &["A=1"]);
    }

    #[test]
    fn test_short_flag_forms() {
        assert_descriptor("bash -c", "bash", &["-c"], &[]);
        assert_descriptor("bash '-c'", "bash", &["-c"], &[]);
        assert_descriptor(r#"bash "-c""#, "bash", &["-c"], &[]);
    }

    #[test]
    fn test_long_flag_forms() {
        assert_descriptor("bash --long", "bash", &["--long"], &[]);
        assert_descriptor("bash --long=value", "bash", &["--long=value"], &[]);
        assert_descriptor("bash --long='value'", "bash", &["--long=value"], &[]);
        assert_descriptor(r#"bash --long="value""#, "bash", &["--long=value"], &[]);
    }

    #[test]
    fn test_assignments_after_command_are_arguments() {
        assert_descriptor("A=1 B=2 cmd C=3", "cmd", &["C=3"], &["A=1", "B=2"]);
    }

    #[test]
    fn test_complex_git_invocation() {
        assert_descriptor(
            "git -c 'versionsort.suffix=-' ls-remote --exit-code --refs --sort='version:refname' --tags origin '*.*.*'",
            "git",
            &[
                "-c",
                "versionsort.suffix=-",
                "ls-remote",
                "--exit-code",
                "--refs",
                "--sort=version:refname",
                "--tags",
                "origin",
                "*.*.*",
            ],
            &[],
        );
    }

    #[test]
    fn test_spaced_assignment_is_normalized() {
        let descriptor = CommandDescriptor::parse(&[r#"" KEY = value " env"#]).unwrap();
        assert_eq!(descriptor.environment(), items(&["KEY=value"]));
        assert_eq!(descriptor.executable(), "env");
    }

    #[test]
    fn test_empty_value_is_not_an_assignment() {
        assert_descriptor("A= cmd", "A=", &["cmd"], &[]);
    }

    #[test]
    fn test_empty_and_env_only_inputs_have_no_executable() {
        assert!(CommandDescriptor::parse(&[""]).unwrap().is_empty());
        assert!(CommandDescriptor::parse(&["   \t "]).unwrap().is_empty());

        let env_only = CommandDescriptor::parse(&["A=1 B=2"]).unwrap();
        assert!(env_only.is_empty());
        assert_eq!(env_only.environment(), items(&["A=1", "B=2"]));
        assert!(env_only.arguments().is_empty());
    }

    #[test]
    fn test_multiple_inputs_are_flattened() {
        let descriptor = CommandDescriptor::parse(&["gh release view", "'v1.2.3'", "--json url"]).unwrap();
        assert_eq!(descriptor.executable(), "gh");
        assert_eq!(
            descriptor.arguments(),
            items(&["release", "view", "v1.2.3", "--json", "url"])
        );
    }

    #[test]
    fn test_env_pairs_keep_order_and_duplicates() {
        let descriptor = CommandDescriptor::parse(&["A=1 A=2 run"]).unwrap();
        let pairs: Vec<_> = descriptor.env_pairs().collect();
        assert_eq!(pairs, vec![("A", "1"), ("A", "2")]);
    }

    #[test]
    fn test_display_is_verbatim() {
        let descriptor = CommandDescriptor::parse(&["TOKEN=abc git push 'my remote'"]).unwrap();
        assert_eq!(descriptor.to_string(), "TOKEN=abc git push my remote");
        assert_eq!(CommandDescriptor::default().to_string(), "");
    }
}
