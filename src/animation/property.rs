use std::fmt;
use std::str::FromStr;

use glam::Vec4;
use rustc_hash::FxHashMap;

use crate::error::VitrineError;

/// An animatable element: a named page or scene object, optionally one of
/// an indexed family (`particle[3]`, `panel-title[1]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId {
    name: &'static str,
    index: Option<u32>,
}

impl TargetId {
    /// A single named element.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name, index: None }
    }

    /// Member `index` of the family `name`.
    #[must_use]
    pub const fn indexed(name: &'static str, index: u32) -> Self {
        Self {
            name,
            index: Some(index),
        }
    }

    /// Element or family name.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.name
    }

    /// Family index, if any.
    #[must_use]
    pub fn index(self) -> Option<u32> {
        self.index
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{i}]", self.name),
            None => f.write_str(self.name),
        }
    }
}

/// Animatable properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    /// Alpha, 1 when unset.
    Opacity,
    /// Horizontal offset in px (or world units for models).
    X,
    /// Vertical offset in px (or world units for models).
    Y,
    /// Uniform scale, 1 when unset.
    Scale,
    /// Rotation about Y in degrees.
    RotateY,
    /// Horizontal offset as a percentage of the element's own width.
    XPercent,
    /// Text glow strength.
    Glow,
    /// Background color.
    Tint,
}

impl Property {
    /// Value of a property nobody has written yet.
    #[must_use]
    pub fn default_value(self) -> Value {
        match self {
            Property::Opacity | Property::Scale => Value::Scalar(1.0),
            Property::Tint => Value::Color(Vec4::ZERO),
            _ => Value::Scalar(0.0),
        }
    }
}

/// A property value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// Plain number.
    Scalar(f32),
    /// Linear RGBA.
    Color(Vec4),
}

impl Value {
    /// Interpolate towards `to`. Mismatched kinds switch at the end.
    #[must_use]
    pub fn lerp(self, to: Self, t: f32) -> Self {
        match (self, to) {
            (Value::Scalar(a), Value::Scalar(b)) => Value::Scalar(a + (b - a) * t),
            (Value::Color(a), Value::Color(b)) => Value::Color(a.lerp(b, t)),
            _ if t >= 1.0 => to,
            _ => self,
        }
    }

    /// Scalar content; colors report their alpha.
    #[must_use]
    pub fn as_scalar(self) -> f32 {
        match self {
            Value::Scalar(v) => v,
            Value::Color(c) => c.w,
        }
    }

    /// Color content; scalars become grey.
    #[must_use]
    pub fn as_color(self) -> Vec4 {
        match self {
            Value::Scalar(v) => Vec4::new(v, v, v, 1.0),
            Value::Color(c) => c,
        }
    }

    fn offset(self, delta: f32) -> Self {
        match self {
            Value::Scalar(v) => Value::Scalar(v + delta),
            Value::Color(c) => Value::Color(c + Vec4::splat(delta)),
        }
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Scalar(v)
    }
}

impl From<Vec4> for Value {
    fn from(c: Vec4) -> Self {
        Value::Color(c)
    }
}

/// Destination of a tweened property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenValue {
    /// Go to this value.
    Absolute(Value),
    /// Move by this amount from wherever the property is when the tween
    /// starts (`"+=20"`, `"-=0.5"`).
    Relative(f32),
}

impl TweenValue {
    /// Final value given the value captured at tween start.
    #[must_use]
    pub fn resolve(self, start: Value) -> Value {
        match self {
            TweenValue::Absolute(v) => v,
            TweenValue::Relative(delta) => start.offset(delta),
        }
    }
}

impl From<f32> for TweenValue {
    fn from(v: f32) -> Self {
        TweenValue::Absolute(Value::Scalar(v))
    }
}

impl From<Vec4> for TweenValue {
    fn from(c: Vec4) -> Self {
        TweenValue::Absolute(Value::Color(c))
    }
}

impl FromStr for TweenValue {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parse = |n: &str| {
            n.trim().parse::<f32>().map_err(|_| {
                VitrineError::InvalidTimeline(format!("bad tween value '{s}'"))
            })
        };
        if let Some(rest) = s.strip_prefix("+=") {
            Ok(TweenValue::Relative(parse(rest)?))
        } else if let Some(rest) = s.strip_prefix("-=") {
            Ok(TweenValue::Relative(-parse(rest)?))
        } else {
            Ok(TweenValue::from(parse(s)?))
        }
    }
}

/// Current value of every animated `(target, property)` pair of a section.
///
/// Timelines write here; renderers and the host page read from here.
#[derive(Debug, Clone, Default)]
pub struct PropertyStore {
    values: FxHashMap<(TargetId, Property), Value>,
    revision: u64,
}

impl PropertyStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value, falling back to [`Property::default_value`].
    #[must_use]
    pub fn get(&self, target: TargetId, property: Property) -> Value {
        self.explicit(target, property)
            .unwrap_or_else(|| property.default_value())
    }

    /// Current value as a number.
    #[must_use]
    pub fn scalar(&self, target: TargetId, property: Property) -> f32 {
        self.get(target, property).as_scalar()
    }

    /// Value written by someone, if any.
    #[must_use]
    pub fn explicit(&self, target: TargetId, property: Property) -> Option<Value> {
        self.values.get(&(target, property)).copied()
    }

    /// Write a value.
    pub fn set(&mut self, target: TargetId, property: Property, value: impl Into<Value>) {
        let value = value.into();
        if self.values.insert((target, property), value) != Some(value) {
            self.revision += 1;
        }
    }

    /// Forget a written value so the default applies again.
    pub fn remove(&mut self, target: TargetId, property: Property) {
        if self.values.remove(&(target, property)).is_some() {
            self.revision += 1;
        }
    }

    /// Counter bumped on every change; compare to detect dirty frames.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of written values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TITLE: TargetId = TargetId::new("title");

    #[test]
    fn defaults_apply_until_written() {
        let mut store = PropertyStore::new();
        assert_eq!(store.scalar(TITLE, Property::Opacity), 1.0);
        assert_eq!(store.scalar(TITLE, Property::Y), 0.0);
        store.set(TITLE, Property::Opacity, 0.0);
        assert_eq!(store.scalar(TITLE, Property::Opacity), 0.0);
        store.remove(TITLE, Property::Opacity);
        assert_eq!(store.explicit(TITLE, Property::Opacity), None);
    }

    #[test]
    fn revision_tracks_changes_only() {
        let mut store = PropertyStore::new();
        store.set(TITLE, Property::Y, 5.0);
        let r = store.revision();
        store.set(TITLE, Property::Y, 5.0);
        assert_eq!(store.revision(), r);
        store.set(TITLE, Property::Y, 6.0);
        assert_eq!(store.revision(), r + 1);
    }

    #[test]
    fn tween_values_parse_relative() {
        assert_eq!("-=0.5".parse::<TweenValue>().unwrap(), TweenValue::Relative(-0.5));
        assert_eq!("+=20".parse::<TweenValue>().unwrap(), TweenValue::Relative(20.0));
        assert_eq!("3".parse::<TweenValue>().unwrap(), TweenValue::from(3.0));
        assert!("up".parse::<TweenValue>().is_err());
        assert_eq!(
            TweenValue::Relative(-0.5).resolve(Value::Scalar(1.0)),
            Value::Scalar(0.5)
        );
    }

    #[test]
    fn color_lerp() {
        let white = Value::Color(Vec4::ONE);
        let clear = Value::Color(Vec4::ZERO);
        assert_eq!(clear.lerp(white, 0.5), Value::Color(Vec4::splat(0.5)));
        assert_eq!(Value::Scalar(0.0).lerp(white, 0.5), Value::Scalar(0.0));
        assert_eq!(Value::Scalar(0.0).lerp(white, 1.0), white);
    }

    #[test]
    fn target_display() {
        assert_eq!(TargetId::indexed("particle", 3).to_string(), "particle[3]");
        assert_eq!(TITLE.to_string(), "title");
    }
}
