//! Sound sources and the mix configuration.
//!
//! A mix is one base noise (White or Brown) plus any subset of the ambient
//! overlays (Fire, Rain, Birds). The configuration packs into a `u32` so the
//! render thread can pick it up with a single atomic load.

use core::fmt;

use crate::error::{EngineError, Result};

/// Every texture the engine knows about.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SoundKind {
    White = 0,
    Brown = 1,
    Fire = 2,
    Rain = 3,
    Birds = 4,
}

impl SoundKind {
    pub const ALL: [SoundKind; 5] = [
        SoundKind::White,
        SoundKind::Brown,
        SoundKind::Fire,
        SoundKind::Rain,
        SoundKind::Birds,
    ];

    pub const COUNT: usize = Self::ALL.len();

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    /// Base noises are mutually exclusive; everything else is an overlay.
    #[inline]
    pub const fn is_base(self) -> bool {
        matches!(self, SoundKind::White | SoundKind::Brown)
    }

    /// Mix-time weight applied before summing.
    #[inline]
    pub const fn mix_weight(self) -> f32 {
        match self {
            SoundKind::White | SoundKind::Brown => 1.0,
            SoundKind::Fire => 0.3,
            SoundKind::Rain => 0.18,
            SoundKind::Birds => 0.15,
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            SoundKind::White => "White Noise",
            SoundKind::Brown => "Brown Noise",
            SoundKind::Fire => "Fire",
            SoundKind::Rain => "Rain",
            SoundKind::Birds => "Birds",
        }
    }

    /// Bundle asset used when the kind is played from a pre-rendered loop.
    pub const fn asset_name(self) -> &'static str {
        match self {
            SoundKind::White => "white_noise",
            SoundKind::Brown => "brown_noise",
            SoundKind::Fire => "fire_ambient",
            SoundKind::Rain => "rain_ambient",
            SoundKind::Birds => "forest_birds",
        }
    }
}

impl fmt::Display for SoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A texture together with how it is produced.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SoundSource {
    pub kind: SoundKind,
    /// `false` when the texture comes from a looping file player.
    pub is_generated: bool,
    pub base_gain: f32,
}

/// Unordered set of overlays.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct OverlaySet(u8);

impl OverlaySet {
    const MASK: u8 = (1 << SoundKind::Fire as u8) | (1 << SoundKind::Rain as u8) | (1 << SoundKind::Birds as u8);

    pub const EMPTY: OverlaySet = OverlaySet(0);

    #[inline]
    pub const fn empty() -> Self {
        Self::EMPTY
    }

    /// Set built from raw bits; bits that are not overlays are dropped.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::MASK)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    const fn bit(kind: SoundKind) -> u8 {
        1 << kind as u8
    }

    #[inline]
    pub const fn contains(self, kind: SoundKind) -> bool {
        self.0 & Self::bit(kind) != 0
    }

    /// Adds `kind`; base kinds are ignored.
    #[inline]
    #[must_use]
    pub const fn with(self, kind: SoundKind) -> Self {
        Self::from_bits(self.0 | Self::bit(kind))
    }

    #[inline]
    #[must_use]
    pub const fn without(self, kind: SoundKind) -> Self {
        Self(self.0 & !Self::bit(kind))
    }

    #[inline]
    #[must_use]
    pub const fn toggled(self, kind: SoundKind) -> Self {
        if self.contains(kind) { self.without(kind) } else { self.with(kind) }
    }

    #[inline]
    #[must_use]
    pub const fn intersection(self, other: OverlaySet) -> Self {
        Self(self.0 & other.0)
    }

    #[inline]
    #[must_use]
    pub const fn difference(self, other: OverlaySet) -> Self {
        Self(self.0 & !other.0)
    }

    #[inline]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = SoundKind> {
        SoundKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl fmt::Debug for OverlaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<SoundKind> for OverlaySet {
    fn from_iter<I: IntoIterator<Item = SoundKind>>(iter: I) -> Self {
        iter.into_iter().fold(OverlaySet::EMPTY, OverlaySet::with)
    }
}

/// Current playback intent: exactly one base noise plus a set of overlays.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MixConfiguration {
    base: SoundKind,
    overlays: OverlaySet,
}

impl Default for MixConfiguration {
    fn default() -> Self {
        Self { base: SoundKind::White, overlays: OverlaySet::EMPTY }
    }
}

impl MixConfiguration {
    /// A mix with the given base and no overlays.
    pub fn new(base: SoundKind) -> Result<Self> {
        Self::default().with_base(base)
    }

    /// Single-selection mix: a base kind replaces the base and clears the
    /// overlays; an overlay kind keeps the current base and becomes the only
    /// overlay.
    #[must_use]
    pub fn single(self, kind: SoundKind) -> Self {
        if kind.is_base() {
            Self { base: kind, overlays: OverlaySet::EMPTY }
        } else {
            Self { base: self.base, overlays: OverlaySet::EMPTY.with(kind) }
        }
    }

    pub fn with_base(self, base: SoundKind) -> Result<Self> {
        if !base.is_base() {
            return Err(EngineError::InvalidSelection(base));
        }
        Ok(Self { base, ..self })
    }

    pub fn toggled(self, overlay: SoundKind) -> Result<Self> {
        if overlay.is_base() {
            return Err(EngineError::InvalidSelection(overlay));
        }
        Ok(Self { overlays: self.overlays.toggled(overlay), ..self })
    }

    #[must_use]
    pub fn with_overlays(self, overlays: OverlaySet) -> Self {
        Self { overlays, ..self }
    }

    #[inline] pub fn base(&self) -> SoundKind { self.base }
    #[inline] pub fn overlays(&self) -> OverlaySet { self.overlays }

    #[inline]
    pub fn contains(&self, kind: SoundKind) -> bool {
        kind == self.base || self.overlays.contains(kind)
    }

    #[inline]
    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    /// All active kinds, base first.
    pub fn kinds(&self) -> impl Iterator<Item = SoundKind> {
        core::iter::once(self.base).chain(self.overlays.iter())
    }

    /// "White Noise + Fire + Rain"
    pub fn title(&self) -> String {
        self.kinds().map(SoundKind::display_name).collect::<Vec<_>>().join(" + ")
    }

    /// Low byte: base index. Second byte: overlay bits.
    #[inline]
    pub fn pack(&self) -> u32 {
        u32::from(self.base as u8) | (u32::from(self.overlays.bits()) << 8)
    }

    #[inline]
    pub fn unpack(bits: u32) -> Option<Self> {
        let base = SoundKind::from_index((bits & 0xff) as usize).filter(|k| k.is_base())?;
        let overlays = OverlaySet::from_bits(((bits >> 8) & 0xff) as u8);
        Some(Self { base, overlays })
    }
}

/// Decides which overlays are played from bundled loops instead of synthesized.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SourcePolicy {
    file_backed: OverlaySet,
}

impl SourcePolicy {
    /// Every kind is synthesized.
    pub const fn synthesized() -> Self {
        Self { file_backed: OverlaySet::EMPTY }
    }

    pub const fn file_backed(overlays: OverlaySet) -> Self {
        Self { file_backed: overlays }
    }

    #[inline]
    pub fn is_generated(&self, kind: SoundKind) -> bool {
        !self.file_backed.contains(kind)
    }

    #[inline]
    pub fn file_backed_set(&self) -> OverlaySet {
        self.file_backed
    }

    pub fn source(&self, kind: SoundKind) -> SoundSource {
        SoundSource { kind, is_generated: self.is_generated(kind), base_gain: kind.mix_weight() }
    }

    /// The part of `mix` the render thread synthesizes.
    pub fn generated_part(&self, mix: MixConfiguration) -> MixConfiguration {
        mix.with_overlays(mix.overlays().difference(self.file_backed))
    }

    /// The overlays of `mix` that need a loop player.
    pub fn file_backed_part(&self, mix: MixConfiguration) -> OverlaySet {
        mix.overlays().intersection(self.file_backed)
    }
}
