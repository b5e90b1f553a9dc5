use super::*;
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;
use crate::renderer::buffer_layout::BufferDataType;

// ============================================================================
// Helpers
// ============================================================================

fn spec(max_vertices: u32) -> DrawBufferSpecification {
    DrawBufferSpecification {
        name: "Test".to_string(),
        vertex_layout: BufferLayout::new(&[("a_Position", BufferDataType::Float3)], true, false),
        instance_layout: Some(BufferLayout::new(&[("a_Transform", BufferDataType::Mat4)], true, true)),
        max_vertices,
        max_indices: 16,
        max_instances: 4,
        vertices: None,
    }
}

fn positions(count: usize) -> Vec<u8> {
    let floats: Vec<f32> = (0..count * 3).map(|i| i as f32).collect();
    bytemuck::cast_slice(&floats).to_vec()
}

// ============================================================================
// Creation
// ============================================================================

#[test]
fn test_create_allocates_every_region() {
    let mut device = MockGraphicsDevice::new();
    let buffer = DrawBuffer::create(&mut device, spec(100)).unwrap();

    assert_eq!(device.buffers.len(), 3);
    assert_eq!(device.buffer("Test.Vertices").unwrap().size(), 12 * 100);
    assert_eq!(device.buffer("Test.Indices").unwrap().size(), 4 * 16);
    assert_eq!(device.buffer("Test.Instances").unwrap().size(), 64 * 4);
    assert_eq!(buffer.capacity(DrawBufferIndex::Vertices), 100);
    assert_eq!(buffer.count(DrawBufferIndex::Vertices), 0);
}

#[test]
fn test_create_without_instances() {
    let mut device = MockGraphicsDevice::new();
    let mut desc = spec(10);
    desc.instance_layout = None;
    let buffer = DrawBuffer::create(&mut device, desc).unwrap();

    assert!(!buffer.has_region(DrawBufferIndex::Instances));
    assert_eq!(buffer.capacity(DrawBufferIndex::Instances), 0);
}

#[test]
fn test_static_initial_data_is_counted() {
    let mut device = MockGraphicsDevice::new();
    let mut desc = spec(6);
    desc.vertices = Some(positions(6));
    let buffer = DrawBuffer::create(&mut device, desc).unwrap();

    assert_eq!(buffer.count(DrawBufferIndex::Vertices), 6);
    assert_eq!(device.buffer("Test.Vertices").unwrap().read::<f32>(12), 3.0);
}

// ============================================================================
// Writes
// ============================================================================

#[test]
fn test_append_and_set_data_track_high_water_mark() {
    let mut device = MockGraphicsDevice::new();
    let mut buffer = DrawBuffer::create(&mut device, spec(100)).unwrap();

    assert_eq!(buffer.append(DrawBufferIndex::Vertices, &positions(3), 3).unwrap(), 0);
    assert_eq!(buffer.append(DrawBufferIndex::Vertices, &positions(2), 2).unwrap(), 3);
    assert_eq!(buffer.count(DrawBufferIndex::Vertices), 5);

    // Overwriting inside the written range keeps the count
    buffer.set_data(DrawBufferIndex::Vertices, &positions(1), 1, 1).unwrap();
    assert_eq!(buffer.count(DrawBufferIndex::Vertices), 5);

    // Writing past it moves the count
    buffer.set_data(DrawBufferIndex::Vertices, &positions(1), 1, 9).unwrap();
    assert_eq!(buffer.count(DrawBufferIndex::Vertices), 10);
}

#[test]
fn test_clear_resets_counts() {
    let mut device = MockGraphicsDevice::new();
    let mut buffer = DrawBuffer::create(&mut device, spec(100)).unwrap();
    buffer.append(DrawBufferIndex::Vertices, &positions(3), 3).unwrap();
    buffer.append(DrawBufferIndex::Indices, bytemuck::cast_slice(&[0u32, 1, 2]), 3).unwrap();

    buffer.clear(DrawBufferIndex::Vertices);
    assert_eq!(buffer.count(DrawBufferIndex::Vertices), 0);
    assert_eq!(buffer.count(DrawBufferIndex::Indices), 3);

    buffer.clear_all();
    assert_eq!(buffer.count(DrawBufferIndex::Indices), 0);
}

#[test]
#[should_panic(expected = "overflow")]
fn test_write_past_capacity_is_fatal() {
    let mut device = MockGraphicsDevice::new();
    let mut buffer = DrawBuffer::create(&mut device, spec(4)).unwrap();
    buffer.append(DrawBufferIndex::Vertices, &positions(3), 3).unwrap();
    let _ = buffer.append(DrawBufferIndex::Vertices, &positions(2), 2);
}

#[test]
#[should_panic(expected = "bytes supplied")]
fn test_mismatched_byte_count_is_fatal() {
    let mut device = MockGraphicsDevice::new();
    let mut buffer = DrawBuffer::create(&mut device, spec(4)).unwrap();
    let _ = buffer.append(DrawBufferIndex::Vertices, &positions(1), 2);
}
