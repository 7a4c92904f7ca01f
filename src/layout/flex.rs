//! Flexbox line layout backed by taffy.
//!
//! [`compute_flex`] builds a small [`TaffyTree`] per arrange: one container
//! node and one fixed-basis leaf per child, sized from the children's desired
//! sizes. It reads back the computed rectangles and drops the tree.

use taffy::prelude::*;

use crate::error::Result;
use crate::geometry::{Rect, Size as UiSize};

/// Main-axis direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexDirection {
    #[default]
    Row,
    Column,
}

/// Main-axis distribution of free space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexJustify {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
}

/// Cross-axis placement of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexAlign {
    Start,
    Center,
    End,
    #[default]
    Stretch,
}

/// One child's input to the flex computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlexItem {
    /// Margin-inclusive desired size.
    pub basis: UiSize,
    pub grow: f32,
    pub shrink: f32,
}

/// Container parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlexParams {
    pub direction: FlexDirection,
    pub justify: FlexJustify,
    pub align: FlexAlign,
    pub gap: f32,
}

/// Convert our params into a taffy container style sized to `container`.
fn container_style(params: &FlexParams, container: UiSize) -> Style {
    Style {
        display: Display::Flex,
        flex_direction: match params.direction {
            FlexDirection::Row => taffy::style::FlexDirection::Row,
            FlexDirection::Column => taffy::style::FlexDirection::Column,
        },
        justify_content: Some(match params.justify {
            FlexJustify::Start => JustifyContent::Start,
            FlexJustify::Center => JustifyContent::Center,
            FlexJustify::End => JustifyContent::End,
            FlexJustify::SpaceBetween => JustifyContent::SpaceBetween,
        }),
        align_items: Some(match params.align {
            FlexAlign::Start => AlignItems::Start,
            FlexAlign::Center => AlignItems::Center,
            FlexAlign::End => AlignItems::End,
            FlexAlign::Stretch => AlignItems::Stretch,
        }),
        gap: taffy::geometry::Size {
            width: LengthPercentage::from_length(params.gap),
            height: LengthPercentage::from_length(params.gap),
        },
        size: taffy::geometry::Size {
            width: Dimension::from_length(container.width),
            height: Dimension::from_length(container.height),
        },
        ..Default::default()
    }
}

/// Leaf style: the main axis is a fixed basis; the cross axis is left to
/// `align_items` when stretching.
fn item_style(params: &FlexParams, item: &FlexItem) -> Style {
    let stretch = params.align == FlexAlign::Stretch;
    let (main, cross) = match params.direction {
        FlexDirection::Row => (item.basis.width, item.basis.height),
        FlexDirection::Column => (item.basis.height, item.basis.width),
    };
    let cross_dim = if stretch {
        Dimension::AUTO
    } else {
        Dimension::from_length(cross)
    };
    let size = match params.direction {
        FlexDirection::Row => taffy::geometry::Size {
            width: Dimension::AUTO,
            height: cross_dim,
        },
        FlexDirection::Column => taffy::geometry::Size {
            width: cross_dim,
            height: Dimension::AUTO,
        },
    };
    Style {
        flex_basis: Dimension::from_length(main),
        flex_grow: item.grow.max(0.0),
        flex_shrink: item.shrink.max(0.0),
        size,
        ..Default::default()
    }
}

/// Lay `items` out in a `container`-sized box and return one rectangle per
/// item, relative to the container.
///
/// The taffy tree lives only for the call: one container node and one leaf
/// per item.
pub fn compute_flex(params: &FlexParams, items: &[FlexItem], container: UiSize) -> Result<Vec<Rect>> {
    if items.is_empty() {
        return Ok(Vec::new());
    }
    let mut tree: TaffyTree<()> = TaffyTree::with_capacity(items.len() + 1);
    let leaves = items
        .iter()
        .map(|item| tree.new_leaf(item_style(params, item)))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let root = tree.new_with_children(container_style(params, container), &leaves)?;
    tree.compute_layout(
        root,
        taffy::geometry::Size {
            width: AvailableSpace::Definite(container.width),
            height: AvailableSpace::Definite(container.height),
        },
    )?;

    let mut rects = Vec::with_capacity(leaves.len());
    for leaf in leaves {
        let layout = tree.layout(leaf)?;
        rects.push(Rect::new(
            layout.location.x,
            layout.location.y,
            layout.size.width,
            layout.size.height,
        ));
    }
    Ok(rects)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(w: f32, h: f32, grow: f32) -> FlexItem {
        FlexItem {
            basis: UiSize::new(w, h),
            grow,
            shrink: 0.0,
        }
    }

    #[test]
    fn row_places_items_in_order() {
        let params = FlexParams {
            align: FlexAlign::Start,
            ..Default::default()
        };
        let rects = compute_flex(&params, &[item(30.0, 10.0, 0.0), item(20.0, 15.0, 0.0)], UiSize::new(100.0, 40.0))
            .unwrap();
        assert_eq!(rects[0], Rect::new(0.0, 0.0, 30.0, 10.0));
        assert_eq!(rects[1], Rect::new(30.0, 0.0, 20.0, 15.0));
    }

    #[test]
    fn grow_takes_free_space() {
        let params = FlexParams {
            gap: 10.0,
            ..Default::default()
        };
        let rects = compute_flex(&params, &[item(30.0, 10.0, 0.0), item(20.0, 10.0, 1.0)], UiSize::new(100.0, 40.0))
            .unwrap();
        assert_eq!(rects[1].x, 40.0);
        assert_eq!(rects[1].width, 60.0);
        // Stretch fills the cross axis.
        assert_eq!(rects[0].height, 40.0);
    }

    #[test]
    fn column_with_center_justify() {
        let params = FlexParams {
            direction: FlexDirection::Column,
            justify: FlexJustify::Center,
            align: FlexAlign::Start,
            gap: 0.0,
        };
        let rects = compute_flex(&params, &[item(10.0, 20.0, 0.0)], UiSize::new(50.0, 100.0))
            .unwrap();
        assert_eq!(rects[0], Rect::new(0.0, 40.0, 10.0, 20.0));
    }

    #[test]
    fn empty_item_list_gives_no_rects() {
        let rects = compute_flex(&FlexParams::default(), &[], UiSize::new(100.0, 10.0)).unwrap();
        assert!(rects.is_empty());
    }
}
