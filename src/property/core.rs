//! Built-in element properties.
//!
//! Every [`PropertyRegistry`](super::PropertyRegistry) starts with these
//! descriptors in this exact order, so their typed handles can be `const`.

use std::sync::Arc;

use super::registry::{PropertyFlags, PropertyMetadata, Property};
use super::value::{impl_enum_value, Object, PropertyValue, Value, ValueType};
use crate::geometry::{Color, Matrix3x2, Point, Rect, Thickness};
use crate::popup::{PlacementMode, PopupAnimation};
use crate::tree::ElementId;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Whether an element is laid out and drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Laid out and drawn.
    #[default]
    Visible,
    /// Laid out, not drawn, not hit-testable.
    Hidden,
    /// Zero-sized, not drawn.
    Collapsed,
}

impl_enum_value!(Visibility, "Visibility", [Visible, Hidden, Collapsed]);

/// Horizontal placement within the layout slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAlignment {
    Left,
    Center,
    Right,
    #[default]
    Stretch,
}

impl_enum_value!(HorizontalAlignment, "HorizontalAlignment", [Left, Center, Right, Stretch]);

/// Vertical placement within the layout slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalAlignment {
    Top,
    Center,
    Bottom,
    #[default]
    Stretch,
}

impl_enum_value!(VerticalAlignment, "VerticalAlignment", [Top, Center, Bottom, Stretch]);

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

pub const VISIBILITY: Property<Visibility> = Property::from_index(0);
pub const IS_ENABLED: Property<bool> = Property::from_index(1);
/// Clamped into `[0, 1]`; NaN is rejected.
pub const OPACITY: Property<f32> = Property::from_index(2);
/// An empty rect means no clip.
pub const CLIP: Property<Rect> = Property::from_index(3);
pub const RENDER_TRANSFORM: Property<Option<Matrix3x2>> = Property::from_index(4);
/// Relative to the render size: `(0.5, 0.5)` is the center.
pub const RENDER_TRANSFORM_ORIGIN: Property<Point> = Property::from_index(5);
pub const CLIP_TO_BOUNDS: Property<bool> = Property::from_index(6);
pub const IS_HIT_TEST_VISIBLE: Property<bool> = Property::from_index(7);
pub const FOCUSABLE: Property<bool> = Property::from_index(8);
pub const TAB_INDEX: Property<i32> = Property::from_index(9);
pub const NAME: Property<String> = Property::from_index(10);
/// NaN means auto.
pub const WIDTH: Property<f32> = Property::from_index(11);
/// NaN means auto.
pub const HEIGHT: Property<f32> = Property::from_index(12);
pub const MIN_WIDTH: Property<f32> = Property::from_index(13);
pub const MAX_WIDTH: Property<f32> = Property::from_index(14);
pub const MIN_HEIGHT: Property<f32> = Property::from_index(15);
pub const MAX_HEIGHT: Property<f32> = Property::from_index(16);
pub const MARGIN: Property<Thickness> = Property::from_index(17);
pub const HORIZONTAL_ALIGNMENT: Property<HorizontalAlignment> = Property::from_index(18);
pub const VERTICAL_ALIGNMENT: Property<VerticalAlignment> = Property::from_index(19);
pub const DATA_CONTEXT: Property<Option<Object>> = Property::from_index(20);
pub const FOREGROUND: Property<Color> = Property::from_index(21);
pub const FONT_SIZE: Property<f32> = Property::from_index(22);
pub const IS_OPEN: Property<bool> = Property::from_index(23);
pub const PLACEMENT_MODE: Property<PlacementMode> = Property::from_index(24);
pub const PLACEMENT_TARGET: Property<Option<ElementId>> = Property::from_index(25);
pub const HORIZONTAL_OFFSET: Property<f32> = Property::from_index(26);
pub const VERTICAL_OFFSET: Property<f32> = Property::from_index(27);
pub const STAYS_OPEN: Property<bool> = Property::from_index(28);
pub const POPUP_ANIMATION: Property<PopupAnimation> = Property::from_index(29);

// ---------------------------------------------------------------------------
// Descriptor table
// ---------------------------------------------------------------------------

/// One row of the built-in table.
pub(crate) struct CoreEntry {
    pub name: &'static str,
    pub owner: &'static str,
    pub value_type: ValueType,
    pub attached: bool,
    pub metadata: PropertyMetadata,
}

fn entry<T: PropertyValue>(
    _handle: Property<T>,
    owner: &'static str,
    name: &'static str,
    metadata: PropertyMetadata,
) -> CoreEntry {
    CoreEntry {
        name,
        owner,
        value_type: T::value_type(),
        attached: false,
        metadata,
    }
}

fn non_negative(v: &Value) -> bool {
    v.as_float().is_some_and(|f| f >= 0.0 && !f.is_nan())
}

fn finite_non_negative(v: &Value) -> bool {
    v.as_float().is_some_and(|f| f >= 0.0 && f.is_finite())
}

fn auto_or_length(v: &Value) -> bool {
    v.as_float().is_some_and(|f| f.is_nan() || (f >= 0.0 && f.is_finite()))
}

fn finite(v: &Value) -> bool {
    v.as_float().is_some_and(f32::is_finite)
}

/// The built-in descriptors, in id order.
pub(crate) fn core_descriptors() -> Vec<CoreEntry> {
    use PropertyFlags as F;

    let measure = F::AFFECTS_MEASURE;
    let arrange = F::AFFECTS_ARRANGE;
    let render = F::AFFECTS_RENDER;

    let table = vec![
        entry(
            VISIBILITY,
            "UIElement",
            "Visibility",
            PropertyMetadata::new(Visibility::Visible).with_flags(measure | render),
        ),
        entry(
            IS_ENABLED,
            "UIElement",
            "IsEnabled",
            PropertyMetadata::new(true).with_flags(render),
        ),
        entry(
            OPACITY,
            "UIElement",
            "Opacity",
            PropertyMetadata::new(1.0_f32)
                .with_flags(render)
                .with_validator(|v| v.as_float().is_some_and(|f| !f.is_nan()))
                .with_coercer(|v| v.as_float().map(|f| Value::Float(f.clamp(0.0, 1.0)))),
        ),
        entry(CLIP, "UIElement", "Clip", PropertyMetadata::new(Rect::EMPTY).with_flags(render)),
        entry(
            RENDER_TRANSFORM,
            "UIElement",
            "RenderTransform",
            PropertyMetadata::new(None::<Matrix3x2>).with_flags(render),
        ),
        entry(
            RENDER_TRANSFORM_ORIGIN,
            "UIElement",
            "RenderTransformOrigin",
            PropertyMetadata::new(Point::ZERO).with_flags(render),
        ),
        entry(
            CLIP_TO_BOUNDS,
            "UIElement",
            "ClipToBounds",
            PropertyMetadata::new(false).with_flags(render),
        ),
        entry(
            IS_HIT_TEST_VISIBLE,
            "UIElement",
            "IsHitTestVisible",
            PropertyMetadata::new(true),
        ),
        entry(FOCUSABLE, "UIElement", "Focusable", PropertyMetadata::new(false)),
        entry(TAB_INDEX, "UIElement", "TabIndex", PropertyMetadata::new(i32::MAX)),
        entry(
            NAME,
            "FrameworkElement",
            "Name",
            PropertyMetadata::new(String::new()).on_changed(|tree, args| {
                let old = args.old_as::<String>().unwrap_or_default();
                let new = args.new_as::<String>().unwrap_or_default();
                tree.name_changed(args.element, &old, &new);
            }),
        ),
        entry(
            WIDTH,
            "FrameworkElement",
            "Width",
            PropertyMetadata::new(f32::NAN)
                .with_flags(measure)
                .with_validator(auto_or_length),
        ),
        entry(
            HEIGHT,
            "FrameworkElement",
            "Height",
            PropertyMetadata::new(f32::NAN)
                .with_flags(measure)
                .with_validator(auto_or_length),
        ),
        entry(
            MIN_WIDTH,
            "FrameworkElement",
            "MinWidth",
            PropertyMetadata::new(0.0_f32)
                .with_flags(measure)
                .with_validator(finite_non_negative),
        ),
        entry(
            MAX_WIDTH,
            "FrameworkElement",
            "MaxWidth",
            PropertyMetadata::new(f32::INFINITY)
                .with_flags(measure)
                .with_validator(non_negative),
        ),
        entry(
            MIN_HEIGHT,
            "FrameworkElement",
            "MinHeight",
            PropertyMetadata::new(0.0_f32)
                .with_flags(measure)
                .with_validator(finite_non_negative),
        ),
        entry(
            MAX_HEIGHT,
            "FrameworkElement",
            "MaxHeight",
            PropertyMetadata::new(f32::INFINITY)
                .with_flags(measure)
                .with_validator(non_negative),
        ),
        entry(
            MARGIN,
            "FrameworkElement",
            "Margin",
            PropertyMetadata::new(Thickness::ZERO).with_flags(measure),
        ),
        entry(
            HORIZONTAL_ALIGNMENT,
            "FrameworkElement",
            "HorizontalAlignment",
            PropertyMetadata::new(HorizontalAlignment::Stretch).with_flags(arrange),
        ),
        entry(
            VERTICAL_ALIGNMENT,
            "FrameworkElement",
            "VerticalAlignment",
            PropertyMetadata::new(VerticalAlignment::Stretch).with_flags(arrange),
        ),
        entry(
            DATA_CONTEXT,
            "FrameworkElement",
            "DataContext",
            PropertyMetadata::new(None::<Object>)
                .with_flags(F::INHERITS)
                .on_changed(|tree, args| tree.refresh_bindings(args.element)),
        ),
        entry(
            FOREGROUND,
            "TextElement",
            "Foreground",
            PropertyMetadata::new(Color::BLACK).with_flags(F::INHERITS | render),
        ),
        entry(
            FONT_SIZE,
            "TextElement",
            "FontSize",
            PropertyMetadata::new(14.0_f32)
                .with_flags(F::INHERITS | measure)
                .with_validator(|v| v.as_float().is_some_and(|f| f > 0.0 && f.is_finite())),
        ),
        entry(
            IS_OPEN,
            "Popup",
            "IsOpen",
            PropertyMetadata::new(false).on_changed(|tree, args| {
                tree.queue_popup_change(args.element);
            }),
        ),
        entry(
            PLACEMENT_MODE,
            "Popup",
            "Placement",
            PropertyMetadata::new(PlacementMode::Bottom),
        ),
        entry(
            PLACEMENT_TARGET,
            "Popup",
            "PlacementTarget",
            PropertyMetadata::new(None::<ElementId>),
        ),
        entry(
            HORIZONTAL_OFFSET,
            "Popup",
            "HorizontalOffset",
            PropertyMetadata::new(0.0_f32).with_validator(finite),
        ),
        entry(
            VERTICAL_OFFSET,
            "Popup",
            "VerticalOffset",
            PropertyMetadata::new(0.0_f32).with_validator(finite),
        ),
        entry(STAYS_OPEN, "Popup", "StaysOpen", PropertyMetadata::new(true)),
        entry(
            POPUP_ANIMATION,
            "Popup",
            "PopupAnimation",
            PropertyMetadata::new(PopupAnimation::None),
        ),
    ];

    debug_assert_eq!(table.len(), POPUP_ANIMATION.id().index() as usize + 1);
    table
}

/// Convenience for building an [`Object`] from any shareable value.
pub fn object<T: Send + Sync + 'static>(value: T) -> Object {
    Arc::new(value)
}

// ===========================================================================
// Tests
// ===========================================================================
