//! Vertex attribute descriptions
//!
//! A [`VertexAttribute`] carries everything `glVertexAttribPointer` needs.
//! The [`vertex_attribute!`](crate::vertex_attribute) macro derives one from
//! a `#[repr(C)]` vertex struct field, taking the component type and count
//! from the field's type and the offset and stride from the struct layout.

use super::device::ComponentType;
use super::draw::Color;

/// Scalar types usable as attribute components
pub trait AttributeComponent: bytemuck::Pod {
    /// Device component type
    const TYPE: ComponentType;
}

macro_rules! attribute_component {
    ($($ty:ty => $component:ident),* $(,)?) => {
        $(impl AttributeComponent for $ty {
            const TYPE: ComponentType = ComponentType::$component;
        }

        impl AttributeValue for $ty {
            const COMPONENT: ComponentType = ComponentType::$component;
            const COMPONENTS: i32 = 1;
        })*
    };
}

attribute_component! {
    i8 => Byte,
    u8 => UnsignedByte,
    i16 => Short,
    u16 => UnsignedShort,
    i32 => Int,
    u32 => UnsignedInt,
    f32 => Float,
    f64 => Double,
}

/// Field types usable as a whole vertex attribute
pub trait AttributeValue {
    /// Component type
    const COMPONENT: ComponentType;
    /// Components per vertex (1-4)
    const COMPONENTS: i32;
}

macro_rules! attribute_array {
    ($($n:literal),*) => {
        $(impl<T: AttributeComponent> AttributeValue for [T; $n] {
            const COMPONENT: ComponentType = T::TYPE;
            const COMPONENTS: i32 = $n;
        })*
    };
}

attribute_array!(1, 2, 3, 4);

impl AttributeValue for Color {
    const COMPONENT: ComponentType = ComponentType::UnsignedByte;
    const COMPONENTS: i32 = 4;
}

/// Layout of one attribute slot within an interleaved vertex buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Attribute slot
    pub index: u32,
    /// Components per vertex (1-4)
    pub components: i32,
    /// Component type
    pub component_type: ComponentType,
    /// Map integer components to `0.0..=1.0` (or `-1.0..=1.0`) on fetch
    pub normalized: bool,
    /// Bytes between consecutive vertices
    pub stride: i32,
    /// Byte offset of the first component
    pub offset: usize,
}

impl VertexAttribute {
    /// Describe a slot explicitly
    #[must_use]
    pub const fn new(
        index: u32,
        components: i32,
        component_type: ComponentType,
        normalized: bool,
        stride: i32,
        offset: usize,
    ) -> Self {
        Self {
            index,
            components,
            component_type,
            normalized,
            stride,
            offset,
        }
    }

    /// Describe a slot for a field of vertex type `V`
    ///
    /// `field` only drives type inference; use the
    /// [`vertex_attribute!`](crate::vertex_attribute) macro rather than
    /// calling this directly.
    #[must_use]
    pub fn for_field<V, F: AttributeValue>(
        index: u32,
        offset: usize,
        normalized: bool,
        _field: fn(&V) -> &F,
    ) -> Self {
        Self::new(
            index,
            F::COMPONENTS,
            F::COMPONENT,
            normalized,
            i32::try_from(std::mem::size_of::<V>()).unwrap_or(i32::MAX),
            offset,
        )
    }
}

/// Build a [`VertexAttribute`] for a field of a `#[repr(C)]` vertex struct
///
/// ```rust
/// use glkit::prelude::*;
///
/// #[repr(C)]
/// #[derive(Clone, Copy)]
/// struct Vertex {
///     position: [f32; 3],
///     color: Color,
/// }
///
/// let position = vertex_attribute!(Vertex, position, 0);
/// let color = vertex_attribute!(Vertex, color, 1, true);
/// assert_eq!(position.stride, 16);
/// assert_eq!(color.offset, 12);
/// ```
#[macro_export]
macro_rules! vertex_attribute {
    ($vertex:ty, $field:ident, $index:expr) => {
        $crate::vertex_attribute!($vertex, $field, $index, false)
    };
    ($vertex:ty, $field:ident, $index:expr, $normalized:expr) => {
        $crate::render::VertexAttribute::for_field::<$vertex, _>(
            $index,
            ::core::mem::offset_of!($vertex, $field),
            $normalized,
            |vertex: &$vertex| &vertex.$field,
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(C)]
    #[derive(Clone, Copy)]
    struct Vertex {
        position: [f32; 3],
        uv: [f32; 2],
        material: u32,
    }

    #[test]
    fn test_macro_reads_layout() {
        let position = crate::vertex_attribute!(Vertex, position, 0);
        let uv = crate::vertex_attribute!(Vertex, uv, 1);
        let material = crate::vertex_attribute!(Vertex, material, 2);

        assert_eq!(position.components, 3);
        assert_eq!(position.component_type, ComponentType::Float);
        assert_eq!(position.offset, 0);
        assert_eq!(uv.offset, 12);
        assert_eq!(uv.components, 2);
        assert_eq!(material.component_type, ComponentType::UnsignedInt);
        assert_eq!(material.components, 1);
        assert_eq!(material.offset, 20);
        assert!([position, uv, material].iter().all(|a| a.stride == 24));
    }
}
