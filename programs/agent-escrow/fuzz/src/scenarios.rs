//! Simulated escrow ledger for property-based testing
//!
//! `SimulatedLedger` executes the instruction semantics against in-memory
//! state so invariants can be checked without the Solana runtime. Failed
//! operations are rolled back, as the runtime does, with one exception:
//! a withdrawal whose transfer fails keeps its balance at zero.

use std::collections::BTreeMap;

use crate::arbitrary::LedgerOp;
use crate::invariants::*;

/// Account identity (pubkey bytes)
pub type Identity = [u8; 32];

pub const MAX_WORKERS: usize = 10;
pub const MAX_METADATA_URI_LEN: usize = 128;
pub const JOBS_PER_PAGE: usize = 64;
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
pub const FIRST_JOB_ID: u64 = 1;
pub const EMPTY_PROOF_HASH: [u8; 32] = [0u8; 32];

/// Designated owner used by the fuzz targets
pub const PROTOCOL_OWNER: Identity = [0xAA; 32];

/// Simulated agent record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulatedAgent {
    pub worker: Identity,
    pub owner: Identity,
    pub metadata_uri: String,
    pub total_earned: u64,
    pub available_balance: u64,
    pub jobs_completed: u64,
    pub transfer_locked: bool,
    /// Lamports held by the agent account above its rent
    pub lamports: u64,
}

/// Simulated job record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulatedJob {
    pub job_id: u64,
    pub client: Identity,
    pub escrowed_amount: u64,
    /// Lamports held by the job account above its rent
    pub lamports: u64,
    pub created_at: i64,
    pub completed_at: i64,
    pub assigned_workers: Vec<Identity>,
    pub per_worker_payment: Vec<u64>,
    pub status: u8,
    pub rating: u8,
    pub is_rated: bool,
    pub proof_hashes: Vec<[u8; 32]>,
    pub verified: Vec<bool>,
}

impl SimulatedJob {
    pub fn all_verified(&self) -> bool {
        !self.verified.is_empty() && self.verified.iter().all(|v| *v)
    }

    pub fn allocated_amount(&self) -> Option<u64> {
        self.per_worker_payment
            .iter()
            .try_fold(0u64, |acc, share| acc.checked_add(*share))
    }
}

/// Result of a simulated instruction execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationResult {
    Success,
    Error(String),
    InvariantViolation(String),
}

impl SimulationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SimulationResult::Success)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SimulationResult::Error(_))
    }

    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, SimulationResult::InvariantViolation(_))
    }

    /// True when this is the named error.
    pub fn is_error_kind(&self, kind: &str) -> bool {
        matches!(self, SimulationResult::Error(e) if e == kind)
    }
}

fn error(kind: &str) -> SimulationResult {
    SimulationResult::Error(kind.to_string())
}

fn violation<T: std::fmt::Debug>(result: T) -> SimulationResult {
    SimulationResult::InvariantViolation(format!("{:?}", result))
}

/// Accepts any non-zero hash.
pub fn placeholder_verify(proof_hash: &[u8; 32]) -> bool {
    *proof_hash != EMPTY_PROOF_HASH
}

fn record_job(index: &mut BTreeMap<Identity, Vec<u64>>, identity: Identity, job_id: u64) {
    let ids = index.entry(identity).or_default();
    if ids.last() != Some(&job_id) {
        ids.push(job_id);
    }
}

fn page_of(ids: Option<&Vec<u64>>, page: u32) -> Vec<u64> {
    let start = (page as usize).saturating_mul(JOBS_PER_PAGE);
    ids.map(|ids| ids.iter().skip(start).take(JOBS_PER_PAGE).copied().collect())
        .unwrap_or_default()
}

fn checked_sum(mut values: impl Iterator<Item = u64>) -> u64 {
    values
        .try_fold(0u64, |acc, v| acc.checked_add(v))
        .unwrap_or(u64::MAX)
}

/// In-memory model of the whole program state
#[derive(Debug, Clone)]
pub struct SimulatedLedger {
    /// Designated owner of the pause switch
    pub owner: Identity,
    pub paused: bool,
    pub reentrancy_locked: bool,
    pub next_job_id: u64,
    /// Clock used for created/completed timestamps
    pub now: i64,
    pub jobs: BTreeMap<u64, SimulatedJob>,
    pub agents: BTreeMap<Identity, SimulatedAgent>,
    pub client_jobs: BTreeMap<Identity, Vec<u64>>,
    pub agent_jobs: BTreeMap<Identity, Vec<u64>>,
    /// Lamports paid out to each owner by withdrawals
    pub wallets: BTreeMap<Identity, u64>,
    /// Total lamports clients moved into job accounts
    pub total_deposited: u64,
    /// Settlements executed per job
    pub settlements: BTreeMap<u64, u32>,
    pub verifier: fn(&[u8; 32]) -> bool,
}

impl SimulatedLedger {
    pub fn new(owner: Identity) -> Self {
        Self {
            owner,
            paused: false,
            reentrancy_locked: false,
            next_job_id: FIRST_JOB_ID,
            now: 1_700_000_000,
            jobs: BTreeMap::new(),
            agents: BTreeMap::new(),
            client_jobs: BTreeMap::new(),
            agent_jobs: BTreeMap::new(),
            wallets: BTreeMap::new(),
            total_deposited: 0,
            settlements: BTreeMap::new(),
            verifier: placeholder_verify,
        }
    }

    /// Runs `op` and restores the previous state if it fails.
    fn atomically(&mut self, op: impl FnOnce(&mut Self) -> SimulationResult) -> SimulationResult {
        let snapshot = self.clone();
        let result = op(self);
        if result.is_error() {
            *self = snapshot;
        }
        result
    }

    /// Ledger with every identity in `workers` registered as its own owner.
    pub fn with_registered(owner: Identity, workers: &[Identity]) -> Self {
        let mut ledger = Self::new(owner);
        for worker in workers {
            // Repeated identities are already registered
            let _ = ledger.register_agent(*worker, *worker, "");
        }
        ledger
    }

    /// Id of the most recently created job
    pub fn latest_job_id(&self) -> Option<u64> {
        self.jobs.keys().next_back().copied()
    }

    // ========================================================================
    // AccessGate
    // ========================================================================

    pub fn set_paused(&mut self, caller: Identity, paused: bool) -> SimulationResult {
        if caller != self.owner {
            return error("Unauthorized");
        }
        if self.paused == paused {
            return error("InvalidStatus");
        }
        self.paused = paused;
        SimulationResult::Success
    }

    // ========================================================================
    // Directory
    // ========================================================================

    pub fn register_agent(
        &mut self,
        caller: Identity,
        worker: Identity,
        metadata_uri: &str,
    ) -> SimulationResult {
        if self.paused {
            return error("ProtocolPaused");
        }
        if metadata_uri.len() > MAX_METADATA_URI_LEN {
            return error("StringTooLong");
        }
        if !metadata_uri.chars().all(|c| c.is_ascii_graphic() || c == ' ') {
            return error("InvalidInput");
        }
        if self.agents.contains_key(&worker) {
            return error("AlreadyRegistered");
        }

        self.agents.insert(
            worker,
            SimulatedAgent {
                worker,
                owner: caller,
                metadata_uri: metadata_uri.to_string(),
                ..Default::default()
            },
        );
        self.agent_jobs.entry(worker).or_default();
        SimulationResult::Success
    }

    // ========================================================================
    // Ledger
    // ========================================================================

    pub fn create_job(
        &mut self,
        client: Identity,
        assigned_workers: &[Identity],
        per_worker_payment: &[u64],
        escrow_amount: u64,
    ) -> SimulationResult {
        self.atomically(|ledger| {
            ledger.create_job_inner(client, assigned_workers, per_worker_payment, escrow_amount)
        })
    }

    fn create_job_inner(
        &mut self,
        client: Identity,
        assigned_workers: &[Identity],
        per_worker_payment: &[u64],
        escrow_amount: u64,
    ) -> SimulationResult {
        if self.paused {
            return error("ProtocolPaused");
        }
        if assigned_workers.is_empty()
            || assigned_workers.len() != per_worker_payment.len()
            || assigned_workers.len() > MAX_WORKERS
        {
            return error("InvalidArrayLength");
        }
        let allocated = match per_worker_payment
            .iter()
            .try_fold(0u64, |acc, share| acc.checked_add(*share))
        {
            Some(sum) => sum,
            None => return error("ArithmeticOverflow"),
        };
        if escrow_amount < allocated {
            return error("InsufficientFunds");
        }
        if self.reentrancy_locked {
            return error("ReentrancyDetected");
        }

        let job_id = self.next_job_id;
        self.next_job_id = match self.next_job_id.checked_add(1) {
            Some(next) => next,
            None => return error("ArithmeticOverflow"),
        };
        self.total_deposited = match self.total_deposited.checked_add(escrow_amount) {
            Some(total) => total,
            None => return error("ArithmeticOverflow"),
        };

        let worker_count = assigned_workers.len();
        let job = SimulatedJob {
            job_id,
            client,
            escrowed_amount: escrow_amount,
            lamports: escrow_amount,
            created_at: self.now,
            completed_at: 0,
            assigned_workers: assigned_workers.to_vec(),
            per_worker_payment: per_worker_payment.to_vec(),
            status: job_status::PENDING,
            rating: 0,
            is_rated: false,
            proof_hashes: vec![EMPTY_PROOF_HASH; worker_count],
            verified: vec![false; worker_count],
        };

        let alignment = check_array_alignment(
            job.assigned_workers.len(),
            job.per_worker_payment.len(),
            job.proof_hashes.len(),
            job.verified.len(),
            MAX_WORKERS,
        );
        if alignment != JobInvariantResult::Valid {
            return violation(alignment);
        }

        self.jobs.insert(job_id, job);
        record_job(&mut self.client_jobs, client, job_id);
        for worker in assigned_workers {
            record_job(&mut self.agent_jobs, *worker, job_id);
        }
        SimulationResult::Success
    }

    pub fn start_job(&mut self, job_id: u64) -> SimulationResult {
        if self.paused {
            return error("ProtocolPaused");
        }
        let job = match self.jobs.get_mut(&job_id) {
            Some(job) => job,
            None => return error("NotFound"),
        };
        if job.status != job_status::PENDING {
            return error("InvalidStatus");
        }
        job.status = job_status::ONGOING;
        SimulationResult::Success
    }

    // ========================================================================
    // VerificationGate + SettlementEngine
    // ========================================================================

    pub fn submit_proof(
        &mut self,
        job_id: u64,
        worker_index: usize,
        proof_hash: [u8; 32],
    ) -> SimulationResult {
        self.atomically(|ledger| ledger.submit_proof_inner(job_id, worker_index, proof_hash))
    }

    fn submit_proof_inner(
        &mut self,
        job_id: u64,
        worker_index: usize,
        proof_hash: [u8; 32],
    ) -> SimulationResult {
        if self.paused {
            return error("ProtocolPaused");
        }
        let verify = self.verifier;
        let job = match self.jobs.get_mut(&job_id) {
            Some(job) => job,
            None => return error("NotFound"),
        };
        if job.status != job_status::ONGOING {
            return error("InvalidStatus");
        }
        if worker_index >= job.assigned_workers.len() {
            return error("IndexOutOfRange");
        }
        if !verify(&proof_hash) {
            return error("InvalidProof");
        }

        job.proof_hashes[worker_index] = proof_hash;
        job.verified[worker_index] = true;

        if job.all_verified() {
            self.settle(job_id)
        } else {
            SimulationResult::Success
        }
    }

    /// Completes a fully verified job and credits every worker.
    fn settle(&mut self, job_id: u64) -> SimulationResult {
        if self.reentrancy_locked {
            return error("ReentrancyDetected");
        }
        let now = self.now;
        let job = match self.jobs.get_mut(&job_id) {
            Some(job) => job,
            None => return error("NotFound"),
        };
        if job.status != job_status::ONGOING || !job.all_verified() {
            return error("InvalidStatus");
        }
        let expected = match job.allocated_amount() {
            Some(sum) => sum,
            None => return error("ArithmeticOverflow"),
        };

        let transition = check_job_state_transition(job.status, job_status::COMPLETED);
        if transition != JobInvariantResult::Valid {
            return violation(transition);
        }
        job.status = job_status::COMPLETED;
        job.completed_at = now;

        let mut credited: u64 = 0;
        let payouts: Vec<(Identity, u64)> = job
            .assigned_workers
            .iter()
            .copied()
            .zip(job.per_worker_payment.iter().copied())
            .collect();

        for (worker, amount) in payouts {
            let agent = match self.agents.get_mut(&worker) {
                Some(agent) => agent,
                None => return error("NotFound"),
            };
            let (balance, earned, completed, lamports) = match (
                agent.available_balance.checked_add(amount),
                agent.total_earned.checked_add(amount),
                agent.jobs_completed.checked_add(1),
                agent.lamports.checked_add(amount),
            ) {
                (Some(b), Some(e), Some(c), Some(l)) => (b, e, c, l),
                _ => return error("ArithmeticOverflow"),
            };
            agent.available_balance = balance;
            agent.total_earned = earned;
            agent.jobs_completed = completed;
            agent.lamports = lamports;

            job.lamports = match job.lamports.checked_sub(amount) {
                Some(rest) => rest,
                None => return error("TransferFailed"),
            };
            credited = match credited.checked_add(amount) {
                Some(sum) => sum,
                None => return error("ArithmeticOverflow"),
            };
        }

        let credit = check_settlement_credit(expected, credited);
        if credit != SettlementInvariantResult::Valid {
            return violation(credit);
        }

        let count = self.settlements.entry(job_id).or_insert(0);
        *count += 1;
        let single = check_single_settlement(job_id, *count);
        if single != SettlementInvariantResult::Valid {
            return violation(single);
        }

        SimulationResult::Success
    }

    // ========================================================================
    // WithdrawalManager
    // ========================================================================

    /// Withdraws with a transfer that always succeeds.
    pub fn withdraw(&mut self, caller: Identity, worker: Identity) -> SimulationResult {
        self.withdraw_with_transfer(caller, worker, |_, _| true)
    }

    /// Withdraws the worker's balance, calling `transfer` at the point the
    /// lamports leave the agent account. `transfer` sees the ledger as it
    /// is mid-withdrawal (it may try to re-enter) and returns whether the
    /// payment went through.
    ///
    /// Not rolled back on failure: the balance stays zero if the transfer
    /// fails.
    pub fn withdraw_with_transfer<F>(
        &mut self,
        caller: Identity,
        worker: Identity,
        mut transfer: F,
    ) -> SimulationResult
    where
        F: FnMut(&mut SimulatedLedger, u64) -> bool,
    {
        if self.paused {
            return error("ProtocolPaused");
        }
        let global_locked = self.reentrancy_locked;
        let agent = match self.agents.get_mut(&worker) {
            Some(agent) => agent,
            None => return error("NotFound"),
        };
        if agent.transfer_locked || global_locked {
            return error("ReentrancyDetected");
        }
        if agent.owner != caller {
            return error("Unauthorized");
        }
        if agent.available_balance == 0 {
            return error("NoBalance");
        }

        agent.transfer_locked = true;
        let amount = agent.available_balance;
        let earned_before = agent.total_earned;
        agent.available_balance = 0;
        self.reentrancy_locked = true;

        let delivered = transfer(self, amount);

        self.reentrancy_locked = false;
        let agent = match self.agents.get_mut(&worker) {
            Some(agent) => agent,
            None => return violation("agent record vanished mid-withdrawal"),
        };
        agent.transfer_locked = false;

        let check = check_withdrawal(
            agent.available_balance,
            earned_before,
            agent.total_earned,
            agent.transfer_locked,
        );
        if check != WithdrawalInvariantResult::Valid {
            return violation(check);
        }

        if !delivered {
            return error("TransferFailed");
        }

        agent.lamports = match agent.lamports.checked_sub(amount) {
            Some(rest) => rest,
            None => return violation(LedgerInvariantResult::BalanceExceedsLamports {
                balance: amount,
                lamports: agent.lamports,
            }),
        };
        let owner = agent.owner;
        let wallet = self.wallets.entry(owner).or_insert(0);
        let before = *wallet;
        *wallet = match wallet.checked_add(amount) {
            Some(total) => total,
            None => return error("ArithmeticOverflow"),
        };
        let paid = check_no_overpayment(*wallet - before, amount);
        if paid != WithdrawalInvariantResult::Valid {
            return violation(paid);
        }

        SimulationResult::Success
    }

    // ========================================================================
    // RatingStore
    // ========================================================================

    pub fn rate_job(&mut self, caller: Identity, job_id: u64, rating: u8) -> SimulationResult {
        if self.paused {
            return error("ProtocolPaused");
        }
        let job = match self.jobs.get_mut(&job_id) {
            Some(job) => job,
            None => return error("NotFound"),
        };
        if job.client != caller {
            return error("Unauthorized");
        }
        if job.status != job_status::COMPLETED {
            return error("InvalidStatus");
        }
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return error("InvalidRating");
        }
        if job.is_rated {
            return error("AlreadyRated");
        }
        job.rating = rating;
        job.is_rated = true;
        SimulationResult::Success
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub fn get_job(&self, job_id: u64) -> Option<&SimulatedJob> {
        self.jobs.get(&job_id)
    }

    pub fn get_agent(&self, worker: &Identity) -> Option<&SimulatedAgent> {
        self.agents.get(worker)
    }

    pub fn list_client_jobs(&self, client: &Identity, page: u32) -> Vec<u64> {
        page_of(self.client_jobs.get(client), page)
    }

    pub fn list_agent_jobs(&self, worker: &Identity, page: u32) -> Vec<u64> {
        page_of(self.agent_jobs.get(worker), page)
    }

    // ========================================================================
    // Whole-ledger invariants
    // ========================================================================

    /// Checks every stored record and the lamport accounting.
    pub fn check_invariants(&self) -> SimulationResult {
        for job in self.jobs.values() {
            let alignment = check_array_alignment(
                job.assigned_workers.len(),
                job.per_worker_payment.len(),
                job.proof_hashes.len(),
                job.verified.len(),
                MAX_WORKERS,
            );
            if alignment != JobInvariantResult::Valid {
                return violation(alignment);
            }
            let funded = check_escrow_covers_shares(job.escrowed_amount, &job.per_worker_payment);
            if funded != JobInvariantResult::Valid {
                return violation(funded);
            }
            let rating = check_rating_state(job.status, job.is_rated, job.rating, MIN_RATING, MAX_RATING);
            if rating != RatingInvariantResult::Valid {
                return violation(rating);
            }
            let completion = check_completion_time(job.job_id, job.status, job.completed_at);
            if completion != SettlementInvariantResult::Valid {
                return violation(completion);
            }
            let settlements = self.settlements.get(&job.job_id).copied().unwrap_or(0);
            let single = check_single_settlement(job.job_id, settlements);
            if single != SettlementInvariantResult::Valid {
                return violation(single);
            }
            if job.status == job_status::CANCELLED {
                return violation("job reached CANCELLED");
            }
        }

        for agent in self.agents.values() {
            let backed = check_balance_backed(agent.available_balance, agent.lamports);
            if backed != LedgerInvariantResult::Valid {
                return violation(backed);
            }
        }

        let conservation = check_lamport_conservation(
            self.total_deposited,
            checked_sum(self.jobs.values().map(|j| j.lamports)),
            checked_sum(self.agents.values().map(|a| a.lamports)),
            checked_sum(self.wallets.values().copied()),
        );
        if conservation != LedgerInvariantResult::Valid {
            return violation(conservation);
        }

        SimulationResult::Success
    }
}

// ============================================================================
// Random operation sequences
// ============================================================================

/// Maps a fuzzed slot onto an existing job id, or onto an unknown id when
/// no job exists yet.
pub fn job_id_for_slot(ledger: &SimulatedLedger, slot: u8) -> u64 {
    let ids: Vec<u64> = ledger.jobs.keys().copied().collect();
    if ids.is_empty() {
        slot as u64
    } else {
        ids[slot as usize % ids.len()]
    }
}

pub fn apply_op(ledger: &mut SimulatedLedger, op: &LedgerOp) -> SimulationResult {
    match op {
        LedgerOp::Register { caller, worker } => ledger.register_agent(*caller, *worker, ""),
        LedgerOp::CreateJob {
            client,
            workers,
            payments,
            surplus,
        } => {
            let allocated: u64 = payments.iter().sum();
            ledger.create_job(*client, workers, payments, allocated + surplus)
        }
        LedgerOp::Start { job_slot } => {
            let job_id = job_id_for_slot(ledger, *job_slot);
            ledger.start_job(job_id)
        }
        LedgerOp::Submit {
            job_slot,
            worker_index,
            proof_hash,
        } => {
            let job_id = job_id_for_slot(ledger, *job_slot);
            ledger.submit_proof(job_id, *worker_index, *proof_hash)
        }
        LedgerOp::Withdraw {
            caller,
            worker,
            transfer_succeeds,
        } => {
            let succeeds = *transfer_succeeds;
            ledger.withdraw_with_transfer(*caller, *worker, |_, _| succeeds)
        }
        LedgerOp::Rate {
            caller,
            job_slot,
            rating,
        } => {
            let job_id = job_id_for_slot(ledger, *job_slot);
            ledger.rate_job(*caller, job_id, *rating)
        }
        LedgerOp::SetPaused { caller, paused } => ledger.set_paused(*caller, *paused),
    }
}
