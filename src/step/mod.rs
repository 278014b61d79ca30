//! Step kinds a path or handler is composed of.
//!
//! `Step` is a closed sum type: one variant per step-kind tag, carrying only
//! the fields that kind's pattern captures. Identity and source position live
//! on the owning `NodeItem`.

pub mod registry;

pub use registry::NodeRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    // Control flow into other paths
    Require { path: String },
    RequireElse { path1: String, path2: String },
    Enter { path: String },
    ForkTo { fork_to: String, fork_name: String },
    ForkToAndWait { fork_to: String, fork_name: String },
    IfEnter { condition: String, path: String },
    ElseEnter { path: String },

    // Services
    Invoke { service: String },
    IfInvoke { condition: String, service: String },
    ElseInvoke { service: String },

    // Signals
    WaitSig { signal: String },
    WaitSigEnter { signal: String, timeout: String, path: String },
    WaitSigInvoke { signal: String, timeout: String, service: String },
    WaitSigs { signals: String },
    WaitSigsEnter { signals: String, timeout: String, path: String },
    WaitSigsInvoke { signals: String, timeout: String, service: String },
    IgnoreSignal { signal: String },
    IgnoreSignals { signals: String },

    // Events and pipeline
    Emit { event: String },
    Set { key: String, value: String },
}

impl Step {
    /// The registry tag this step is constructed under.
    pub fn tag(&self) -> &'static str {
        match self {
            Step::Require { .. } => "require",
            Step::RequireElse { .. } => "require_else",
            Step::Enter { .. } => "enter",
            Step::ForkTo { .. } => "fork_to",
            Step::ForkToAndWait { .. } => "fork_to_and_wait",
            Step::IfEnter { .. } => "if_enter",
            Step::ElseEnter { .. } => "else_enter",
            Step::Invoke { .. } => "invoke",
            Step::IfInvoke { .. } => "if_invoke",
            Step::ElseInvoke { .. } => "else_invoke",
            Step::WaitSig { .. } => "wait_sig",
            Step::WaitSigEnter { .. } => "wait_sig_enter",
            Step::WaitSigInvoke { .. } => "wait_sig_invoke",
            Step::WaitSigs { .. } => "wait_sigs",
            Step::WaitSigsEnter { .. } => "wait_sigs_enter",
            Step::WaitSigsInvoke { .. } => "wait_sigs_invoke",
            Step::IgnoreSignal { .. } => "ignore_signal",
            Step::IgnoreSignals { .. } => "ignore_signals",
            Step::Emit { .. } => "emit",
            Step::Set { .. } => "set",
        }
    }

    /// Names of paths this step transfers control to.
    pub fn path_refs(&self) -> Vec<&str> {
        match self {
            Step::Require { path }
            | Step::Enter { path }
            | Step::IfEnter { path, .. }
            | Step::ElseEnter { path }
            | Step::WaitSigEnter { path, .. }
            | Step::WaitSigsEnter { path, .. } => vec![path.trim()],
            Step::RequireElse { path1, path2 } => vec![path1.trim(), path2.trim()],
            Step::ForkTo { fork_to, .. } | Step::ForkToAndWait { fork_to, .. } => {
                split_list(fork_to)
            }
            _ => vec![],
        }
    }

    /// The raw timeout expression, e.g. `30s`.
    pub fn timeout(&self) -> Option<&str> {
        match self {
            Step::WaitSigEnter { timeout, .. }
            | Step::WaitSigInvoke { timeout, .. }
            | Step::WaitSigsEnter { timeout, .. }
            | Step::WaitSigsInvoke { timeout, .. } => Some(timeout.as_str()),
            _ => None,
        }
    }

    /// The raw comma-separated signal list.
    pub fn signals(&self) -> Option<&str> {
        match self {
            Step::WaitSigs { signals }
            | Step::WaitSigsEnter { signals, .. }
            | Step::WaitSigsInvoke { signals, .. }
            | Step::IgnoreSignals { signals } => Some(signals.as_str()),
            _ => None,
        }
    }
}

/// Split a comma-separated list, dropping empty elements.
pub fn split_list(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fork_targets_are_split() {
        let step = Step::ForkToAndWait {
            fork_to: "path1, path2,".into(),
            fork_name: "my.fork".into(),
        };
        assert_eq!(step.path_refs(), vec!["path1", "path2"]);
    }

    #[test]
    fn invoke_has_no_path_refs() {
        let step = Step::IfInvoke {
            condition: "c".into(),
            service: "svc".into(),
        };
        assert!(step.path_refs().is_empty());
        assert_eq!(step.timeout(), None);
        assert_eq!(step.signals(), None);
    }

    #[test]
    fn wait_variants_expose_timeout_and_signals() {
        let step = Step::WaitSigsEnter {
            signals: "a, b".into(),
            timeout: "10s".into(),
            path: "p2".into(),
        };
        assert_eq!(step.timeout(), Some("10s"));
        assert_eq!(step.signals(), Some("a, b"));
        assert_eq!(step.path_refs(), vec!["p2"]);
        assert_eq!(step.tag(), "wait_sigs_enter");
    }
}
