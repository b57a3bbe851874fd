/// Per-type code scanners
///
/// Each scanner owns the in-process rules for its resource types. Rules only
/// read the hydrated instance and the preflight indexes.
mod key_vault;
mod public_ip;
mod rules;
mod storage;
mod virtual_machine;

pub use key_vault::KeyVaultScanner;
pub use public_ip::PublicIpScanner;
pub use storage::StorageScanner;
pub use virtual_machine::VirtualMachineScanner;

use crate::ports::outbound::ServiceScanner;
use std::sync::Arc;

/// Every built-in scanner
pub fn builtin_scanners() -> Vec<Arc<dyn ServiceScanner>> {
    vec![
        Arc::new(KeyVaultScanner),
        Arc::new(PublicIpScanner),
        Arc::new(StorageScanner),
        Arc::new(VirtualMachineScanner),
    ]
}
