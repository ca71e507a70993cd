//! Lending lifecycle walkthrough.
//!
//! Runs four transaction sequences against in-memory collaborators:
//!
//! 1. A lender escrows 100 of 1000 into an offer.
//! 2. A borrower accepts it with a matching eligibility proof.
//! 3. After the admin rotates the credential commitment, a stale proof is
//!    rejected.
//! 4. The lender cancels an open offer; a second cancel is rejected.
//!
//! ```sh
//! RUST_LOG=debug cargo run -p zklend-lifecycle
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zklend_core::{
    AttestationVerifier, CredentialProof, EscrowLedger, InMemoryLedger, InMemoryStateStore,
    LendingConfig, LendingModule, Offer, OfferId, PoolKeySource, PublicInput, TokenId,
    Transaction,
};
use zklend_crypto::{Commitment, Keypair};

const ASSET: TokenId = TokenId(1);

#[derive(Parser, Debug)]
#[command(name = "zklend-lifecycle", about = "Offer/loan lifecycle walkthrough")]
struct Cli {
    /// Load module configuration from a JSON file instead of the built-in one.
    #[arg(long, value_name = "PATH")]
    config: Option<std::path::PathBuf>,

    /// Public hex seed for a reproducible pool identity. The pool is a hashed
    /// curve point, so the seed grants no signing power.
    #[arg(long, value_name = "HEX")]
    pool_seed: Option<String>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let admin = Keypair::from_seed([1u8; 32]);
    let lender = Keypair::from_seed([2u8; 32]);
    let borrower = Keypair::from_seed([3u8; 32]);
    let prover = Keypair::from_seed([4u8; 32]);
    let credential = Commitment::credential(&[0xc0; 32], &[50_000, 2_000]);

    let mut config = match &cli.config {
        Some(path) => LendingConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => LendingConfig::new(admin.identity()).with_credential_commitment(credential),
    };
    if let Some(seed) = cli.pool_seed {
        config = config.with_pool(PoolKeySource::Seed { seed });
    }

    let mut ledger = InMemoryLedger::new();
    ledger.mint(ASSET, lender.identity(), 1_000u64)?;

    let mut module = LendingModule::genesis(
        &config,
        InMemoryStateStore::new(),
        ledger,
        AttestationVerifier::new(prover.identity()),
    )?;
    let pool = module.pool_identity();
    let as_admin = Transaction::from_sender(admin.identity());
    let as_lender = Transaction::from_sender(lender.identity());
    let as_borrower = Transaction::from_sender(borrower.identity());

    // A: create and escrow.
    let offer = Offer::new(OfferId(1), lender.identity(), ASSET, 100u64)
        .with_min_property_value(50_000)
        .with_min_income_monthly(2_000);
    module.create_offer(&as_lender, offer)?;
    info!(
        lender = %module.ledger().balance(ASSET, &lender.identity()),
        pool = %module.ledger().balance(ASSET, &pool),
        "Offer 1 escrowed"
    );

    // B: accept with a proof bound to the registered commitment.
    let commitment = module
        .credential_commitment()?
        .context("no credential commitment registered")?;
    let proof = CredentialProof::attest(
        &prover,
        PublicInput {
            address: borrower.identity(),
            credential_commitment: commitment,
            min_property_value: 50_000,
            min_income_monthly: 2_000,
        },
    );
    let loan = module.accept_offer(&as_borrower, OfferId(1), borrower.identity(), &proof)?;
    info!(
        loan_id = %loan.loan_id,
        amount = %loan.amount,
        borrower_balance = %module.ledger().balance(ASSET, &borrower.identity()),
        "Loan created"
    );

    // C: rotate the commitment, the old proof no longer matches.
    module.create_offer(
        &as_lender,
        Offer::new(OfferId(2), lender.identity(), ASSET, 200u64)
            .with_min_property_value(50_000)
            .with_min_income_monthly(2_000),
    )?;
    module.update_credential_commit(
        &as_admin,
        Commitment::credential(&[0xc1; 32], &[50_000, 2_000]),
    )?;
    match module.accept_offer(&as_borrower, OfferId(2), borrower.identity(), &proof) {
        Ok(_) => bail!("stale proof was accepted"),
        Err(err) => info!(kind = ?err.kind(), error = %err, "Stale proof rejected"),
    }

    // D: cancel refunds, a second cancel is a state-guard error.
    module.cancel_offer(&as_lender, OfferId(2))?;
    match module.cancel_offer(&as_lender, OfferId(2)) {
        Ok(()) => bail!("offer 2 cancelled twice"),
        Err(err) => info!(kind = ?err.kind(), error = %err, "Second cancel rejected"),
    }

    info!(
        lender = %module.ledger().balance(ASSET, &lender.identity()),
        pool = %module.ledger().balance(ASSET, &pool),
        "Final balances"
    );
    for event in module.take_events() {
        info!(event = event.name(), detail = ?event, "Committed");
    }

    Ok(())
}
