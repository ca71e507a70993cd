//! Privileged registry operations. Both require the sender to be the stored
//! admin.

use zklend_crypto::{Commitment, Identity};

use crate::error::LendError;
use crate::events::LendingEvent;
use crate::ledger::EscrowLedger;
use crate::module::LendingModule;
use crate::proof::ProofVerifier;
use crate::staging::Staged;
use crate::store::StateStore;
use crate::types::Transaction;

fn require_admin<S: StateStore, L: EscrowLedger>(
    staged: &Staged<'_, S, L>,
    sender: Identity,
) -> Result<Identity, LendError> {
    let admin = staged
        .admin()?
        .ok_or_else(|| LendError::InvariantViolation("no registry admin set".to_string()))?;
    if admin != sender {
        return Err(LendError::NotAdmin { sender });
    }
    Ok(admin)
}

impl<S: StateStore, L: EscrowLedger, V: ProofVerifier> LendingModule<S, L, V> {
    /// Replace the credential commitment that acceptance proofs must match.
    pub fn update_credential_commit(
        &mut self,
        tx: &Transaction,
        commitment: Commitment,
    ) -> Result<(), LendError> {
        self.execute("update_credential_commit", tx, |staged, _| {
            require_admin(staged, tx.sender)?;
            staged.put_credential_commitment(&commitment)?;
            Ok(((), LendingEvent::CredentialCommitmentUpdated { commitment }))
        })
    }

    pub fn update_admin(&mut self, tx: &Transaction, new_admin: Identity) -> Result<(), LendError> {
        self.execute("update_admin", tx, |staged, _| {
            let previous = require_admin(staged, tx.sender)?;
            staged.put_admin(&new_admin)?;
            Ok((
                (),
                LendingEvent::AdminUpdated {
                    previous,
                    admin: new_admin,
                },
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LendingConfig, PoolKeySource};
    use crate::error::ErrorKind;
    use crate::ledger::InMemoryLedger;
    use crate::proof::AttestationVerifier;
    use crate::store::InMemoryStateStore;
    use zklend_crypto::Keypair;

    fn id(seed: u8) -> Identity {
        Keypair::from_seed([seed; 32]).identity()
    }

    fn module() -> LendingModule<InMemoryStateStore, InMemoryLedger, AttestationVerifier> {
        LendingModule::genesis(
            &LendingConfig::new(id(1)).with_pool(PoolKeySource::seed(&[9u8; 32])),
            InMemoryStateStore::new(),
            InMemoryLedger::new(),
            AttestationVerifier::new(id(2)),
        )
        .unwrap()
    }

    #[test]
    fn admin_can_replace_commitment() {
        let mut module = module();
        let commitment = Commitment::credential(&[1u8; 32], &[42]);

        module
            .update_credential_commit(&Transaction::from_sender(id(1)), commitment)
            .unwrap();

        assert_eq!(module.credential_commitment().unwrap(), Some(commitment));
        assert_eq!(
            module.events(),
            &[LendingEvent::CredentialCommitmentUpdated { commitment }]
        );
    }

    #[test]
    fn non_admin_cannot_replace_commitment() {
        let mut module = module();
        let err = module
            .update_credential_commit(
                &Transaction::from_sender(id(3)),
                Commitment::credential(&[1u8; 32], &[42]),
            )
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert_eq!(module.credential_commitment().unwrap(), None);
    }

    #[test]
    fn admin_handover_moves_authority() {
        let mut module = module();
        module
            .update_admin(&Transaction::from_sender(id(1)), id(3))
            .unwrap();
        assert_eq!(module.admin().unwrap(), Some(id(3)));

        let err = module
            .update_admin(&Transaction::from_sender(id(1)), id(1))
            .unwrap_err();
        assert!(matches!(err, LendError::NotAdmin { .. }));

        module
            .update_admin(&Transaction::from_sender(id(3)), id(4))
            .unwrap();
        assert_eq!(module.admin().unwrap(), Some(id(4)));
    }
}
