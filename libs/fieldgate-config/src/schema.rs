//! SQLite DDL for the entity tables derived from a configuration document
//!
//! Every table except `config_snapshots` is fully replaced on each
//! deployment; `config_snapshots` is an append-only audit log and never
//! participates in the delete/reinsert cycle.

/// Raw document audit log
pub const CONFIG_SNAPSHOTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS config_snapshots (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        raw TEXT NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
"#;

/// IO ports (parent of devices)
pub const IO_PORTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS io_ports (
        id TEXT PRIMARY KEY,
        type TEXT NOT NULL DEFAULT '',
        name TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        scan_time INTEGER NOT NULL DEFAULT 0,
        time_out INTEGER NOT NULL DEFAULT 0,
        retry_count INTEGER NOT NULL DEFAULT 0,
        auto_recover_time INTEGER NOT NULL DEFAULT 0,
        scan_mode TEXT NOT NULL DEFAULT '',
        enabled BOOLEAN NOT NULL DEFAULT 1,
        serial_settings TEXT
    )
"#;

/// Devices (parent of IO tags)
pub const DEVICES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS devices (
        id TEXT PRIMARY KEY,
        port_id TEXT NOT NULL REFERENCES io_ports(id) ON DELETE CASCADE,
        name TEXT NOT NULL DEFAULT '',
        device_type TEXT NOT NULL DEFAULT '',
        unit_number INTEGER NOT NULL DEFAULT 0,
        tag_write_type TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        add_device_name_as_prefix BOOLEAN NOT NULL DEFAULT 0,
        use_ascii_protocol BOOLEAN NOT NULL DEFAULT 0,
        packet_delay INTEGER NOT NULL DEFAULT 0,
        digital_block_size INTEGER NOT NULL DEFAULT 0,
        analog_block_size INTEGER NOT NULL DEFAULT 0,
        enabled BOOLEAN NOT NULL DEFAULT 1
    )
"#;

/// IO tags, globally referenceable via the `device:tag` name key
pub const IO_TAGS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS io_tags (
        id TEXT PRIMARY KEY,
        device_id TEXT NOT NULL REFERENCES devices(id) ON DELETE CASCADE,
        name TEXT NOT NULL DEFAULT '',
        data_type TEXT NOT NULL DEFAULT '',
        register_type TEXT NOT NULL DEFAULT '',
        conversion_type TEXT NOT NULL DEFAULT '',
        address TEXT NOT NULL DEFAULT '',
        start_bit INTEGER NOT NULL DEFAULT 0,
        length_bit INTEGER NOT NULL DEFAULT 0,
        span_low REAL NOT NULL DEFAULT 0,
        span_high REAL NOT NULL DEFAULT 0,
        default_value REAL NOT NULL DEFAULT 0,
        scan_rate INTEGER NOT NULL DEFAULT 0,
        read_write TEXT NOT NULL DEFAULT '',
        scale_type TEXT NOT NULL DEFAULT '',
        formula TEXT NOT NULL DEFAULT '',
        scale REAL NOT NULL DEFAULT 1,
        offset REAL NOT NULL DEFAULT 0,
        clamp_to_low BOOLEAN NOT NULL DEFAULT 0,
        clamp_to_high BOOLEAN NOT NULL DEFAULT 0,
        clamp_to_zero BOOLEAN NOT NULL DEFAULT 0,
        description TEXT NOT NULL DEFAULT ''
    )
"#;

/// Calculation tags with eight operand slots and their resolved tag ids
pub const CALCULATION_TAGS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS calculation_tags (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL DEFAULT '',
        default_value REAL NOT NULL DEFAULT 0,
        formula TEXT NOT NULL DEFAULT '',
        a TEXT, b TEXT, c TEXT, d TEXT,
        e TEXT, f TEXT, g TEXT, h TEXT,
        a_tag_id TEXT, b_tag_id TEXT, c_tag_id TEXT, d_tag_id TEXT,
        e_tag_id TEXT, f_tag_id TEXT, g_tag_id TEXT, h_tag_id TEXT,
        period INTEGER NOT NULL DEFAULT 0,
        read_write TEXT NOT NULL DEFAULT '',
        span_low REAL NOT NULL DEFAULT 0,
        span_high REAL NOT NULL DEFAULT 0,
        is_parent BOOLEAN NOT NULL DEFAULT 0,
        description TEXT NOT NULL DEFAULT ''
    )
"#;

/// Stats tags referencing one IO tag by name
pub const STATS_TAGS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS stats_tags (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL DEFAULT '',
        refer_tag TEXT,
        refer_tag_id TEXT,
        type TEXT NOT NULL DEFAULT '',
        update_cycle_value INTEGER NOT NULL DEFAULT 0,
        update_cycle_unit TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT ''
    )
"#;

/// Communication bridges (parent of blocks)
pub const BRIDGES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS bridges (
        id TEXT PRIMARY KEY
    )
"#;

/// Ordered processing blocks inside a bridge
pub const BRIDGE_BLOCKS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS bridge_blocks (
        id TEXT PRIMARY KEY,
        bridge_id TEXT NOT NULL REFERENCES bridges(id) ON DELETE CASCADE,
        type TEXT NOT NULL DEFAULT '',
        sub_type TEXT NOT NULL DEFAULT '',
        label TEXT NOT NULL DEFAULT '',
        config_json TEXT,
        sort_order INTEGER NOT NULL DEFAULT 0
    )
"#;

/// All entity tables in creation order (parents before children)
pub const ALL_TABLES: &[&str] = &[
    CONFIG_SNAPSHOTS_TABLE,
    IO_PORTS_TABLE,
    DEVICES_TABLE,
    IO_TAGS_TABLE,
    CALCULATION_TAGS_TABLE,
    STATS_TAGS_TABLE,
    BRIDGES_TABLE,
    BRIDGE_BLOCKS_TABLE,
];

/// Secondary indexes
pub const ALL_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_devices_port ON devices(port_id)",
    "CREATE INDEX IF NOT EXISTS idx_io_tags_device ON io_tags(device_id)",
    "CREATE INDEX IF NOT EXISTS idx_bridge_blocks_bridge ON bridge_blocks(bridge_id)",
    "CREATE INDEX IF NOT EXISTS idx_config_snapshots_created ON config_snapshots(created_at)",
];
