//! Construction directives recorded by a program implementation.

/// One recorded directive. Roles are resolved only at replay time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    NewBug {
        specification: String,
        role: String,
    },
    /// `source`'s data output feeds data input `input` of `target`
    DataFlow {
        source: String,
        target: String,
        input: usize,
    },
    /// Control output `output` of `source` hands over to `target`
    ControlFlow {
        source: String,
        output: usize,
        target: String,
    },
    ExposeDataIn {
        role: String,
        input: usize,
        external: usize,
    },
    ExposeDataOut {
        role: String,
    },
    ExposeControlIn {
        role: String,
    },
    ExposeControlOut {
        role: String,
        output: usize,
        external: usize,
    },
}

/// Replay phases, in replay order. Within a phase directives keep the
/// order they were issued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    NewBug,
    /// Data and control edges, interleaved as issued
    Flow,
    ExposeDataIn,
    ExposeDataOut,
    ExposeControlOut,
    ExposeControlIn,
}

impl Statement {
    pub fn phase(&self) -> Phase {
        match self {
            Statement::NewBug { .. } => Phase::NewBug,
            Statement::DataFlow { .. } | Statement::ControlFlow { .. } => Phase::Flow,
            Statement::ExposeDataIn { .. } => Phase::ExposeDataIn,
            Statement::ExposeDataOut { .. } => Phase::ExposeDataOut,
            Statement::ExposeControlOut { .. } => Phase::ExposeControlOut,
            Statement::ExposeControlIn { .. } => Phase::ExposeControlIn,
        }
    }
}

/// `statements` in replay order.
pub fn replay_order(statements: &[Statement]) -> Vec<&Statement> {
    let mut ordered: Vec<&Statement> = statements.iter().collect();
    // stable: issue order survives within a phase
    ordered.sort_by_key(|statement| statement.phase());
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_groups_by_phase_and_keeps_issue_order() {
        let statements = vec![
            Statement::ExposeControlIn { role: "a".into() },
            Statement::ControlFlow {
                source: "a".into(),
                output: 1,
                target: "b".into(),
            },
            Statement::NewBug {
                specification: "+".into(),
                role: "a".into(),
            },
            Statement::DataFlow {
                source: "a".into(),
                target: "b".into(),
                input: 0,
            },
            Statement::NewBug {
                specification: "+".into(),
                role: "b".into(),
            },
            Statement::ExposeDataOut { role: "b".into() },
        ];

        let phases: Vec<Phase> = replay_order(&statements).iter().map(|s| s.phase()).collect();
        assert_eq!(
            phases,
            vec![
                Phase::NewBug,
                Phase::NewBug,
                Phase::Flow,
                Phase::Flow,
                Phase::ExposeDataOut,
                Phase::ExposeControlIn,
            ]
        );

        let ordered = replay_order(&statements);
        assert!(matches!(ordered[0], Statement::NewBug { role, .. } if role == "a"));
        assert!(matches!(ordered[2], Statement::ControlFlow { .. }));
        assert!(matches!(ordered[3], Statement::DataFlow { .. }));
    }
}
