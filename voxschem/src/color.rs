//! Colors, palettes, and nearest-color matching.

use core::fmt;

// -------------------------------------------------------------------------------------------------

/// An 8-bit-per-channel RGBA color, as stored in `.vox` palettes.
///
/// Two colors are equal only if all four channels are equal.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(from = "ColorRepr", into = "[u8; 4]")]
#[expect(clippy::exhaustive_structs)]
pub struct Color {
    #[allow(missing_docs)]
    pub r: u8,
    #[allow(missing_docs)]
    pub g: u8,
    #[allow(missing_docs)]
    pub b: u8,
    #[allow(missing_docs)]
    pub a: u8,
}

impl Color {
    /// Transparent black, used for palette slots that have no defined color.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Constructs a [`Color`] from its channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Constructs an opaque [`Color`].
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Unpacks a little-endian `0xAABBGGRR` word, the layout used by the default palette.
    pub const fn from_packed(packed: u32) -> Self {
        let [r, g, b, a] = packed.to_le_bytes();
        Self { r, g, b, a }
    }

    /// Euclidean distance between the RGB channels of `self` and `other`.
    /// Alpha is ignored.
    pub fn distance(self, other: Color) -> f64 {
        let dr = f64::from(self.r.abs_diff(other.r));
        let dg = f64::from(self.g.abs_diff(other.g));
        let db = f64::from(self.b.abs_diff(other.b));
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let &Self { r, g, b, a } = self;
        write!(f, "Red: {r} Green: {g} Blue: {b} Alpha: {a}")
    }
}

impl From<[u8; 4]> for Color {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Color> for [u8; 4] {
    fn from(Color { r, g, b, a }: Color) -> Self {
        [r, g, b, a]
    }
}

/// Serialized form of [`Color`]: either `[r, g, b]` (opaque) or `[r, g, b, a]`.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Rgb([u8; 3]),
    Rgba([u8; 4]),
}

impl From<ColorRepr> for Color {
    fn from(value: ColorRepr) -> Self {
        match value {
            ColorRepr::Rgb([r, g, b]) => Color::opaque(r, g, b),
            ColorRepr::Rgba(rgba) => Color::from(rgba),
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Number of entries in a [`Palette`].
pub const PALETTE_LEN: usize = 256;

/// A table of 256 colors which voxels refer to by index.
///
/// Voxel color indices are 1-based: color index `i` refers to entry `i - 1`,
/// and color index 0 refers to no entry.
#[derive(Clone, Eq, PartialEq)]
pub struct Palette {
    entries: Box<[Color; PALETTE_LEN]>,
}

impl Palette {
    /// Constructs a palette from its entries.
    pub fn new(entries: [Color; PALETTE_LEN]) -> Self {
        Self {
            entries: Box::new(entries),
        }
    }

    /// All entries of the palette, in index order.
    pub fn entries(&self) -> &[Color; PALETTE_LEN] {
        &self.entries
    }

    /// Returns the color that a voxel's color index refers to, or [`None`] for color index 0.
    pub fn color_for_index(&self, color_index: u8) -> Option<Color> {
        let slot = usize::from(color_index.checked_sub(1)?);
        Some(self.entries[slot])
    }
}

impl Default for Palette {
    /// Returns the standard MagicaVoxel palette.
    fn default() -> Self {
        Self::new(DEFAULT_PALETTE.map(Color::from_packed))
    }
}

impl fmt::Debug for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 256 entries are too noisy to print; summarize instead.
        let distinct = ColorSet::from_iter(self.entries.iter().copied()).len();
        f.debug_struct("Palette")
            .field("distinct_colors", &distinct)
            .finish_non_exhaustive()
    }
}

// -------------------------------------------------------------------------------------------------

/// A set of distinct [`Color`]s which remembers the order colors were first added in.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ColorSet {
    colors: Vec<Color>,
}

impl ColorSet {
    /// Constructs an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `color` unless an equal color is already present.
    /// Returns whether the color was added.
    pub fn insert(&mut self, color: Color) -> bool {
        if self.colors.contains(&color) {
            false
        } else {
            self.colors.push(color);
            true
        }
    }

    /// Returns whether an equal color is present.
    pub fn contains(&self, color: Color) -> bool {
        self.colors.contains(&color)
    }

    /// Number of distinct colors.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Iterates over the colors in first-seen order.
    pub fn iter(&self) -> core::iter::Copied<core::slice::Iter<'_, Color>> {
        self.colors.iter().copied()
    }
}

impl FromIterator<Color> for ColorSet {
    fn from_iter<T: IntoIterator<Item = Color>>(iter: T) -> Self {
        let mut set = Self::new();
        for color in iter {
            set.insert(color);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ColorSet {
    type Item = Color;
    type IntoIter = core::iter::Copied<core::slice::Iter<'a, Color>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// -------------------------------------------------------------------------------------------------

/// Something that has a color and a type, and so can be chosen by [`nearest_match()`].
pub trait ColorCandidate {
    /// Type used to restrict which candidates are eligible.
    type Kind: PartialEq;

    /// The color this candidate is matched by.
    fn color(&self) -> Color;

    /// The type of this candidate.
    fn kind(&self) -> &Self::Kind;
}

/// Finds the candidate of type `required_kind` whose color is nearest to `target`.
///
/// Distance is [`Color::distance()`], which ignores alpha. Among equally near candidates,
/// the earliest one wins.
///
/// If no candidate has the required kind, the first candidate is returned regardless of
/// its kind. Returns [`None`] only if `candidates` is empty.
pub fn nearest_match<'c, C: ColorCandidate>(
    target: Color,
    candidates: &'c [C],
    required_kind: &C::Kind,
) -> Option<&'c C> {
    let mut best: Option<(&'c C, f64)> = None;
    for candidate in candidates.iter().filter(|c| c.kind() == required_kind) {
        let distance = target.distance(candidate.color());
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((candidate, distance)),
        }
    }
    match best {
        Some((candidate, _)) => Some(candidate),
        None => candidates.first(),
    }
}

// -------------------------------------------------------------------------------------------------

/// The standard MagicaVoxel palette, as little-endian `0xAABBGGRR` words.
#[rustfmt::skip]
pub(crate) static DEFAULT_PALETTE: [u32; PALETTE_LEN] = [
    0x00000000, 0xffffffff, 0xffccffff, 0xff99ffff, 0xff66ffff, 0xff33ffff, 0xff00ffff, 0xffffccff,
    0xffccccff, 0xff99ccff, 0xff66ccff, 0xff33ccff, 0xff00ccff, 0xffff99ff, 0xffcc99ff, 0xff9999ff,
    0xff6699ff, 0xff3399ff, 0xff0099ff, 0xffff66ff, 0xffcc66ff, 0xff9966ff, 0xff6666ff, 0xff3366ff,
    0xff0066ff, 0xffff33ff, 0xffcc33ff, 0xff9933ff, 0xff6633ff, 0xff3333ff, 0xff0033ff, 0xffff00ff,
    0xffcc00ff, 0xff9900ff, 0xff6600ff, 0xff3300ff, 0xff0000ff, 0xffffffcc, 0xffccffcc, 0xff99ffcc,
    0xff66ffcc, 0xff33ffcc, 0xff00ffcc, 0xffffcccc, 0xffcccccc, 0xff99cccc, 0xff66cccc, 0xff33cccc,
    0xff00cccc, 0xffff99cc, 0xffcc99cc, 0xff9999cc, 0xff6699cc, 0xff3399cc, 0xff0099cc, 0xffff66cc,
    0xffcc66cc, 0xff9966cc, 0xff6666cc, 0xff3366cc, 0xff0066cc, 0xffff33cc, 0xffcc33cc, 0xff9933cc,
    0xff6633cc, 0xff3333cc, 0xff0033cc, 0xffff00cc, 0xffcc00cc, 0xff9900cc, 0xff6600cc, 0xff3300cc,
    0xff0000cc, 0xffffff99, 0xffccff99, 0xff99ff99, 0xff66ff99, 0xff33ff99, 0xff00ff99, 0xffffcc99,
    0xffcccc99, 0xff99cc99, 0xff66cc99, 0xff33cc99, 0xff00cc99, 0xffff9999, 0xffcc9999, 0xff999999,
    0xff669999, 0xff339999, 0xff009999, 0xffff6699, 0xffcc6699, 0xff996699, 0xff666699, 0xff336699,
    0xff006699, 0xffff3399, 0xffcc3399, 0xff993399, 0xff663399, 0xff333399, 0xff003399, 0xffff0099,
    0xffcc0099, 0xff990099, 0xff660099, 0xff330099, 0xff000099, 0xffffff66, 0xffccff66, 0xff99ff66,
    0xff66ff66, 0xff33ff66, 0xff00ff66, 0xffffcc66, 0xffcccc66, 0xff99cc66, 0xff66cc66, 0xff33cc66,
    0xff00cc66, 0xffff9966, 0xffcc9966, 0xff999966, 0xff669966, 0xff339966, 0xff009966, 0xffff6666,
    0xffcc6666, 0xff996666, 0xff666666, 0xff336666, 0xff006666, 0xffff3366, 0xffcc3366, 0xff993366,
    0xff663366, 0xff333366, 0xff003366, 0xffff0066, 0xffcc0066, 0xff990066, 0xff660066, 0xff330066,
    0xff000066, 0xffffff33, 0xffccff33, 0xff99ff33, 0xff66ff33, 0xff33ff33, 0xff00ff33, 0xffffcc33,
    0xffcccc33, 0xff99cc33, 0xff66cc33, 0xff33cc33, 0xff00cc33, 0xffff9933, 0xffcc9933, 0xff999933,
    0xff669933, 0xff339933, 0xff009933, 0xffff6633, 0xffcc6633, 0xff996633, 0xff666633, 0xff336633,
    0xff006633, 0xffff3333, 0xffcc3333, 0xff993333, 0xff663333, 0xff333333, 0xff003333, 0xffff0033,
    0xffcc0033, 0xff990033, 0xff660033, 0xff330033, 0xff000033, 0xffffff00, 0xffccff00, 0xff99ff00,
    0xff66ff00, 0xff33ff00, 0xff00ff00, 0xffffcc00, 0xffcccc00, 0xff99cc00, 0xff66cc00, 0xff33cc00,
    0xff00cc00, 0xffff9900, 0xffcc9900, 0xff999900, 0xff669900, 0xff339900, 0xff009900, 0xffff6600,
    0xffcc6600, 0xff996600, 0xff666600, 0xff336600, 0xff006600, 0xffff3300, 0xffcc3300, 0xff993300,
    0xff663300, 0xff333300, 0xff003300, 0xffff0000, 0xffcc0000, 0xff990000, 0xff660000, 0xff330000,
    0xff0000ee, 0xff0000dd, 0xff0000bb, 0xff0000aa, 0xff000088, 0xff000077, 0xff000055, 0xff000044,
    0xff000022, 0xff000011, 0xff00ee00, 0xff00dd00, 0xff00bb00, 0xff00aa00, 0xff008800, 0xff007700,
    0xff005500, 0xff004400, 0xff002200, 0xff001100, 0xffee0000, 0xffdd0000, 0xffbb0000, 0xffaa0000,
    0xff880000, 0xff770000, 0xff550000, 0xff440000, 0xff220000, 0xff110000, 0xffeeeeee, 0xffdddddd,
    0xffbbbbbb, 0xffaaaaaa, 0xff888888, 0xff777777, 0xff555555, 0xff444444, 0xff222222, 0xff111111,
];

// -------------------------------------------------------------------------------------------------
