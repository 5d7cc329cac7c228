use dao_core::{GovernanceError, TOKEN_DECIMALS};
use member_roster::RosterSnapshot;
use prometheus::{
    register_gauge_vec_with_registry, register_int_counter_vec_with_registry, GaugeVec,
    IntCounterVec, Registry,
};
use proposal_guards::{Execution, VoteOutcome};

pub struct GovernanceMetrics {
    pub vote_attempts_total: IntCounterVec,
    pub pipeline_stage_total: IntCounterVec,
    pub member_token_amount: GaugeVec,
}

impl GovernanceMetrics {
    pub fn new(registry: &Registry) -> prometheus::Result<Self> {
        let vote_attempts_total = register_int_counter_vec_with_registry!(
            "dao_vote_attempts_total",
            "Vote attempts by final result",
            &["result"],
            registry
        )?;

        let pipeline_stage_total = register_int_counter_vec_with_registry!(
            "dao_pipeline_stage_total",
            "Vote pipeline stages reached, by stage and result",
            &["stage", "result"],
            registry
        )?;

        let member_token_amount = register_gauge_vec_with_registry!(
            "dao_member_token_amount",
            "Governance token held per member, whole units",
            &["address"],
            registry
        )?;

        Ok(Self {
            vote_attempts_total,
            pipeline_stage_total,
            member_token_amount,
        })
    }

    pub fn observe_outcome(&self, outcome: &VoteOutcome) {
        if outcome.delegated {
            self.stage("delegate", "ok");
        }
        if outcome.vote_cast.is_some() {
            self.stage("vote", "ok");
        }
        let result = match outcome.execution {
            Execution::Executed => {
                self.stage("execute", "ok");
                "executed"
            }
            Execution::AlreadyExecuted => {
                self.stage("execute", "already_executed");
                "already_executed"
            }
            Execution::NotEligible if outcome.vote_cast.is_some() => "voted",
            Execution::NotEligible => "skipped",
        };
        self.vote_attempts_total.with_label_values(&[result]).inc();
    }

    pub fn observe_error(&self, err: &GovernanceError) {
        let result = if err.is_precondition() { "refused" } else { "failed" };
        self.stage(err.stage(), result);
        self.vote_attempts_total.with_label_values(&[result]).inc();
    }

    /// Replaces the per-member gauges with the snapshot's values.
    pub fn observe_roster(&self, roster: &RosterSnapshot) {
        self.member_token_amount.reset();
        for member in &roster.members {
            let address = member.address.to_string();
            self.member_token_amount
                .with_label_values(&[address.as_str()])
                .set(whole_units(member.token_amount));
        }
    }

    fn stage(&self, stage: &str, result: &str) {
        self.pipeline_stage_total
            .with_label_values(&[stage, result])
            .inc();
    }
}

fn whole_units(base: u128) -> f64 {
    base as f64 / 10f64.powi(TOKEN_DECIMALS as i32)
}
