//! Dispatch constants.

use std::time::Duration;

/// Endpoint of the local node hosting the native asset.
pub const DEFAULT_NATIVE_ENDPOINT: &str = "ws://127.0.0.1:9944";

/// Endpoint of the public Acala Mandala node hosting the default token asset.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "wss://acala-mandala.api.onfinality.io/public-ws";

/// Time allowed for establishing a connection, including the handshake and metadata sync.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Time allowed for a single query or submission.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Display name of the placeholder identity created for unknown reward recipients.
pub const DEFAULT_PLACEHOLDER_NAME: &str = "Unknown";

/// Default mnemonic for development setups. Must be overridden in production.
pub const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// Environment variable holding the faucet mnemonic.
pub const FAUCET_MNEMONIC_ENV: &str = "DISPATCH_FAUCET_MNEMONIC";

/// Environment variable holding the mnemonic custodial signers are derived from.
pub const CUSTODIAL_MNEMONIC_ENV: &str = "DISPATCH_CUSTODIAL_MNEMONIC";

/// Environment variable holding the primary reward amount, in human units.
pub const REWARD_AMOUNT_ENV: &str = "DISPATCH_REWARD_AMOUNT";

/// Environment variable holding the endpoint of the primary reward asset.
pub const REWARD_ENDPOINT_ENV: &str = "DISPATCH_REWARD_ENDPOINT";

/// Environment variable holding the database URL.
pub const DATABASE_URL_ENV: &str = "DISPATCH_DB_URL";
