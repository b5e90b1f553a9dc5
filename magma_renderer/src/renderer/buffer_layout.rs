/// Attribute layout of a draw buffer region

/// Attribute data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferDataType {
    Float,
    Float2,
    Float3,
    Float4,
    Int,
    Mat4,
}

impl BufferDataType {
    /// Size in bytes (tightly packed)
    pub fn size_bytes(&self) -> u32 {
        match self {
            BufferDataType::Float => 4,
            BufferDataType::Float2 => 8,
            BufferDataType::Float3 => 12,
            BufferDataType::Float4 => 16,
            BufferDataType::Int => 4,
            BufferDataType::Mat4 => 64,
        }
    }

    /// Number of scalar components
    pub fn component_count(&self) -> u32 {
        match self {
            BufferDataType::Float | BufferDataType::Int => 1,
            BufferDataType::Float2 => 2,
            BufferDataType::Float3 => 3,
            BufferDataType::Float4 => 4,
            BufferDataType::Mat4 => 16,
        }
    }
}

/// One named attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferElement {
    pub name: String,
    pub data_type: BufferDataType,
    /// Byte offset inside one interleaved element
    pub offset: u32,
}

/// Ordered attribute list plus storage flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferLayout {
    elements: Vec<BufferElement>,
    stride: u32,
    /// Rewritten every frame (vs. uploaded once)
    dynamic: bool,
    /// Each attribute stored in its own contiguous array instead of interleaved
    structure_of_arrays: bool,
}

impl BufferLayout {
    pub fn new(elements: &[(&str, BufferDataType)], dynamic: bool, structure_of_arrays: bool) -> Self {
        let mut offset = 0;
        let elements = elements
            .iter()
            .map(|(name, data_type)| {
                let element = BufferElement {
                    name: name.to_string(),
                    data_type: *data_type,
                    offset,
                };
                offset += data_type.size_bytes();
                element
            })
            .collect();

        Self {
            elements,
            stride: offset,
            dynamic,
            structure_of_arrays,
        }
    }

    pub fn elements(&self) -> &[BufferElement] {
        &self.elements
    }

    /// Bytes per element (sum of attribute sizes)
    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn is_structure_of_arrays(&self) -> bool {
        self.structure_of_arrays
    }
}
