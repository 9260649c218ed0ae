use std::sync::RwLock;

use rust_decimal::Decimal;

/// Singleton site configuration read when constructing deposit
/// instructions.
///
/// `deposit_address` is the externally-configured wallet depositors send
/// to; the minimum thresholds gate submissions (zero means unrestricted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSettings {
    pub deposit_address: String,
    pub min_deposit: Decimal,
    pub min_withdraw: Decimal,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            deposit_address: String::new(),
            min_deposit: Decimal::ZERO,
            min_withdraw: Decimal::ZERO,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SettingsStoreError {
    #[error("deposit address must not be empty")]
    EmptyDepositAddress,
    #[error("minimum amounts must not be negative, min_deposit={min_deposit} min_withdraw={min_withdraw}")]
    NegativeMinimum { min_deposit: Decimal, min_withdraw: Decimal },
    #[error("settings lock poisoned")]
    LockPoisoned,
}

/// One-row settings store, accessed through the same lock discipline as the
/// other stores rather than as an in-process mutable singleton.
#[derive(Debug, Default)]
pub struct SettingsStore(RwLock<SiteSettings>);

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Result<SiteSettings, SettingsStoreError> {
        let settings = self.0.read().map_err(|_| SettingsStoreError::LockPoisoned)?;
        Ok(settings.clone())
    }

    /// # Errors
    ///
    /// Returns [`SettingsStoreError::EmptyDepositAddress`] when `address` is
    /// blank.
    pub fn set_deposit_address(&self, address: &str) -> Result<SiteSettings, SettingsStoreError> {
        if address.trim().is_empty() {
            return Err(SettingsStoreError::EmptyDepositAddress);
        }
        let mut settings = self.0.write().map_err(|_| SettingsStoreError::LockPoisoned)?;
        settings.deposit_address = address.to_owned();
        Ok(settings.clone())
    }

    /// # Errors
    ///
    /// Returns [`SettingsStoreError::NegativeMinimum`] when either threshold
    /// is negative.
    pub fn set_minimums(&self, min_deposit: Decimal, min_withdraw: Decimal) -> Result<SiteSettings, SettingsStoreError> {
        if min_deposit.is_sign_negative() || min_withdraw.is_sign_negative() {
            return Err(SettingsStoreError::NegativeMinimum {
                min_deposit,
                min_withdraw,
            });
        }
        let mut settings = self.0.write().map_err(|_| SettingsStoreError::LockPoisoned)?;
        settings.min_deposit = min_deposit;
        settings.min_withdraw = min_withdraw;
        Ok(settings.clone())
    }
}
