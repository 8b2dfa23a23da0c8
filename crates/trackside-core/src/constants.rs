//! Format constants and import defaults.

// --- Terrain container ---

/// Header length: 1-byte version + 4-byte little-endian grid size.
pub const TERRAIN_HEADER_SIZE: usize = 5;

/// Payload offset used by the current layout (immediately after the header).
pub const CURRENT_PAYLOAD_OFFSET: usize = TERRAIN_HEADER_SIZE;

/// Payload offset used by the legacy layout.
pub const LEGACY_PAYLOAD_OFFSET: usize = 2048;

/// Bytes per height sample.
pub const HEIGHT_ITEM_SIZE: u32 = 2;

/// Bytes per layer sample.
pub const LAYER_ITEM_SIZE: u32 = 1;

/// Mean absolute step between horizontally adjacent samples, normalized to
/// the u16 range, above which a decoded grid is treated as byte-order noise.
pub const MAX_PLAUSIBLE_ROUGHNESS: f64 = 0.05;

// --- Terrain preset ---

/// Height scale used when no preset provides one.
pub const DEFAULT_HEIGHT_SCALE: f64 = 200.0;

// --- DecalRoad defaults (applied when a record omits the field) ---

pub const ROAD_CLASS: &str = "DecalRoad";
pub const DEFAULT_TEXTURE_LENGTH: f64 = 20.0;
pub const DEFAULT_BREAK_ANGLE: f64 = 1.0;
pub const DEFAULT_IMPROVED_SPLINE: bool = true;
pub const DEFAULT_RENDER_PRIORITY: i32 = 9;
pub const DEFAULT_START_END_FADE: [f64; 2] = [5.0, 5.0];
pub const DEFAULT_DISTANCE_FADE: [f64; 2] = [300.0, 50.0];

/// Minimum control points for a road to be constructible.
pub const MIN_ROAD_NODES: usize = 2;

// --- Material defaults ---

pub const MATERIAL_CLASS: &str = "Material";
pub const DEFAULT_MAP_TO: &str = "unmapped_mat";
pub const DEFAULT_MATERIAL_VERSION: f64 = 1.5;
pub const MATERIAL_TAG_SLOTS: usize = 5;

// --- Discovery patterns ---

pub const DEFAULT_ROAD_PATTERNS: &[&str] = &[
    "main/MissionGroup/roads/items.level.json",
    "main/MissionGroup/*/roads/items.level.json",
    "**/roads/items.level.json",
    "**/*roads*.json",
];

pub const DEFAULT_MATERIAL_PATTERNS: &[&str] = &[
    "art/road/*.materials.json",
    "art/**/*.materials.json",
    "**/*.materials.json",
];

pub const DEFAULT_PRESET_PATTERNS: &[&str] = &[
    "*.terrainPreset.json",
    "**/terrainPresets/*.json",
    "**/*terrain*preset*.json",
];

pub const DEFAULT_TERRAIN_DESCRIPTOR_PATTERNS: &[&str] = &["**/*.terrain.json"];

/// Files whose presence marks a directory as a level root.
pub const LEVEL_ROOT_MARKERS: &[&str] = &["main.level.json", "info.json"];

/// Extension of the binary terrain container.
pub const TERRAIN_EXTENSION: &str = "ter";

/// How many ancestors `find_level_root` inspects above the starting path.
pub const LEVEL_ROOT_SEARCH_DEPTH: usize = 5;
