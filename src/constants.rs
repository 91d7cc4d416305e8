// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Protocol and API constants

use std::time::Duration;

/// First byte of every SIA/DC-09 datagram.
pub const FRAME_START: u8 = b'\n';
/// Trailing byte of an outbound ACK frame.
pub const FRAME_END: u8 = b'\r';
/// Offset of the data block inside a datagram: start, 2 CRC bytes, filler, 3 length chars.
pub const FRAME_HEADER_LEN: usize = 7;

/// Message token carrying a Contact-ID body.
pub const TOKEN_CID: &str = "ADM-CID";
/// Message token of the communicator's link test.
pub const TOKEN_NULL: &str = "NULL";
/// Token used when acknowledging a frame.
pub const TOKEN_ACK: &str = "ACK";

/// Timestamp layout trailing each data block.
pub const FRAME_TIMESTAMP_FORMAT: &str = "%H:%M:%S,%m-%d-%Y";

/// Default UDP port the panel reports to.
pub const DEFAULT_UDP_PORT: u16 = 2123;
/// Receive buffer; larger datagrams are truncated and fail the CRC.
pub const SIA_BUFFER_SIZE: usize = 1024;
/// How long a connector waits for the shared socket to come up.
pub const LISTENER_STARTUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Cloud API host.
pub const DEFAULT_API_BASE_URL: &str = "https://web.garnetcontrol.app";
/// Panel-side command timeout sent in request bodies, in milliseconds.
pub const DEFAULT_API_TIMEOUT_MS: u64 = 8500;
/// Lifetime of a session token.
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(600);
/// Sequence counter wraps back to 0 when it reaches this value.
pub const SEQUENCE_MODULUS: u16 = 256;

/// Keepalive period of the communicator.
pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(60);
pub const MIN_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(60);
/// Period of the authoritative status poll.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Manufacturer reported for every panel.
pub const MANUFACTURER: &str = "Garnet Technologies";

// Device id bases. Partition and zone ids are `base + number` (1-based).
pub const PARTITION_BASE_ID: u32 = 0;
pub const ZONE_BASE_ID: u32 = 10;
pub const HOWLER_BASE_ID: u32 = 50;
pub const FIRE_BUTTON_ID: u32 = 51;
pub const MEDICAL_BUTTON_ID: u32 = 52;
pub const PANIC_BUTTON_ID: u32 = 53;
pub const TIMED_PANIC_BUTTON_ID: u32 = 54;
pub const COMMUNICATOR_ID: u32 = 55;
pub const REFRESH_BUTTON_ID: u32 = 56;

/// Panel limits of the status frame.
pub const MAX_PARTITIONS: usize = 4;
pub const MAX_ZONES: usize = 32;

// Server messages with a fixed meaning.
pub const MSG_NO_RESPONSE: &str = "No se recibió respuesta del sistema en el tiempo máximo esperado";
pub const MSG_COMMAND_IN_PROGRESS: &str = "Ya hay un comando en progreso";
pub const MSG_TOKEN_REJECTED: &str = "Failed to authenticate token.";
pub const MSG_NO_TOKEN: &str = "No token provided.";

/// Icons for the zone icon index reported in the system programming.
pub const ZONE_ICONS: [&str; 12] = [
    "mdi:door",
    "mdi:window-closed-variant",
    "mdi:door-closed",
    "mdi:bed",
    "mdi:sofa",
    "mdi:stove",
    "mdi:garage",
    "mdi:flower",
    "mdi:balcony",
    "mdi:fire",
    "mdi:briefcase",
    "mdi:leak",
];

/// Map a zone icon index to its icon name.
pub fn zone_icon(index: u32) -> Option<&'static str> {
    ZONE_ICONS.get(index as usize).copied()
}
