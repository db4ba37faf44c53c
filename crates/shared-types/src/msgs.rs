//! Destination-chain messages built from validated claims.

use crate::claims::EthereumDeposit;
use crate::entities::{Coin, U256};
use crate::errors::ValidationError;
use crate::validation::{validate_account_address, validate_denom, validate_hex_address};
use serde::{Deserialize, Serialize};

/// Mints an Ethereum ERC20 deposit on Fury. Signed by the relayer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgBridgeEthereumToFury {
    pub relayer: String,
    pub ethereum_erc20_address: String,
    pub amount: U256,
    pub receiver: String,
    pub sequence: U256,
}

impl MsgBridgeEthereumToFury {
    pub fn new(
        relayer: impl Into<String>,
        ethereum_erc20_address: impl Into<String>,
        amount: U256,
        receiver: impl Into<String>,
        sequence: U256,
    ) -> Self {
        Self {
            relayer: relayer.into(),
            ethereum_erc20_address: ethereum_erc20_address.into(),
            amount,
            receiver: receiver.into(),
            sequence,
        }
    }

    pub fn from_deposit(relayer: impl Into<String>, deposit: &EthereumDeposit) -> Self {
        Self::new(
            relayer,
            deposit.ethereum_erc20_address.clone(),
            deposit.amount,
            deposit.receiver.clone(),
            deposit.sequence,
        )
    }

    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        validate_account_address(&self.relayer, "relayer")?;
        validate_hex_address(&self.ethereum_erc20_address, "ethereum ERC20 address")?;
        validate_hex_address(&self.receiver, "receiver address")?;
        if self.amount.is_zero() {
            return Err(ValidationError::NonPositiveAmount);
        }
        Ok(())
    }

    /// Raw account bytes of the signer.
    pub fn get_signers(&self) -> Result<Vec<Vec<u8>>, ValidationError> {
        Ok(vec![validate_account_address(&self.relayer, "relayer")?])
    }
}

/// Converts a Fury coin back to its Ethereum ERC20.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgConvertCoinToErc20 {
    pub initiator: String,
    pub receiver: String,
    pub amount: Coin,
}

impl MsgConvertCoinToErc20 {
    pub fn new(initiator: impl Into<String>, receiver: impl Into<String>, amount: Coin) -> Self {
        Self {
            initiator: initiator.into(),
            receiver: receiver.into(),
            amount,
        }
    }

    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        validate_conversion(&self.initiator, &self.receiver, &self.amount)
    }

    pub fn get_signers(&self) -> Result<Vec<Vec<u8>>, ValidationError> {
        Ok(vec![validate_account_address(&self.initiator, "initiator")?])
    }
}

/// Denom is checked before amount.
pub(crate) fn validate_conversion(
    initiator: &str,
    receiver: &str,
    amount: &Coin,
) -> Result<(), ValidationError> {
    validate_account_address(initiator, "initiator")?;
    validate_hex_address(receiver, "Receiver")?;
    validate_denom(&amount.denom)?;
    if amount.amount.is_zero() {
        return Err(ValidationError::ZeroCoinAmount);
    }
    Ok(())
}
