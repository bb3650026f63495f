use meshletize::*;

#[test]
fn quantization() {
    assert_eq!(quantize_unorm(0.0, 8), 0);
    assert_eq!(quantize_unorm(0.5, 8), 128);
    assert_eq!(quantize_unorm(1.0, 8), 255);
    assert_eq!(quantize_unorm(-1.0, 8), 0);
    assert_eq!(quantize_unorm(2.0, 8), 255);

    assert_eq!(quantize_snorm(0.0, 8), 0);
    assert_eq!(quantize_snorm(1.0, 8), 127);
    assert_eq!(quantize_snorm(-1.0, 8), -127);
    assert_eq!(quantize_snorm(2.0, 8), 127);

    assert_eq!(quantize_half(0.0), 0);
    assert_eq!(quantize_half(1.0), 0x3c00);
    assert_eq!(quantize_half(-1.0), 0xbc00);
    assert_eq!(quantize_half(65504.0), 0x7bff);
}

#[test]
fn index_width_conversion() {
    let wide: Vec<u32> = vec![0, 1, 2, 65535];
    let narrow = convert_indices_32_to_16(&wide).unwrap();
    assert_eq!(narrow, vec![0u16, 1, 2, 65535]);
    assert_eq!(convert_indices_16_to_32(&narrow).unwrap(), wide);

    let too_wide: Vec<u32> = vec![0, 65536];
    assert!(matches!(
        convert_indices_32_to_16(&too_wide),
        Err(Error::InvalidMesh(_))
    ));
}

#[test]
fn vertex_data_adapter_validation() {
    let data = [0u8; 36];

    let adapter = VertexDataAdapter::new(&data, 12, 0).unwrap();
    assert_eq!(adapter.vertex_count, 3);

    // length must divide evenly into strides
    assert!(matches!(
        VertexDataAdapter::new(&data[..30], 12, 0),
        Err(Error::InvalidMesh(_))
    ));
    // position stream must fit inside the stride
    assert!(matches!(
        VertexDataAdapter::new(&data, 12, 4),
        Err(Error::InvalidMesh(_))
    ));
    assert!(matches!(
        VertexDataAdapter::new(&data, 0, 0),
        Err(Error::InvalidMesh(_))
    ));
}

#[test]
fn vertex_data_adapter_position_reads() {
    let positions = [[1f32, 2f32, 3f32], [4f32, 5f32, 6f32]];
    let adapter = VertexDataAdapter::new(typed_to_bytes(&positions), 12, 0).unwrap();

    assert_eq!(adapter.position_at(0).unwrap(), [1f32, 2f32, 3f32]);
    assert_eq!(adapter.position_at(1).unwrap(), [4f32, 5f32, 6f32]);
    assert!(matches!(
        adapter.position_at(2),
        Err(Error::InvalidMesh(_))
    ));
}

#[test]
fn interleaved_position_offset() {
    // stride 20: 8 bytes of preamble, then the position
    let mut data = Vec::new();
    for vertex in 0..2u32 {
        data.extend_from_slice(&[0u8; 8]);
        for axis in 0..3 {
            data.extend_from_slice(&((vertex * 3 + axis) as f32).to_ne_bytes());
        }
    }
    let adapter = VertexDataAdapter::new(&data, 20, 8).unwrap();

    assert_eq!(adapter.position_at(0).unwrap(), [0f32, 1f32, 2f32]);
    assert_eq!(adapter.position_at(1).unwrap(), [3f32, 4f32, 5f32]);
}

#[test]
fn byte_views() {
    let positions = [[0f32; 3]; 4];
    assert_eq!(typed_to_bytes(&positions).len(), 48);

    let descriptor = MeshletDescriptor::default();
    assert_eq!(any_as_u8_slice(&descriptor).len(), 16);
}

#[test]
fn debug_colors() {
    for index in 0..64 {
        let color = meshlet_debug_color(index);
        for channel in color {
            assert!((0.0..=1.0).contains(&channel));
        }
        assert_eq!(color, meshlet_debug_color(index));
    }
    assert_ne!(meshlet_debug_color(0), meshlet_debug_color(1));
}

#[test]
fn vertex_equality_is_ulp_tolerant() {
    let a = Vertex {
        p: [1.0, 2.0, 3.0],
        n: [0.0, 0.0, 1.0],
        t: [0.5, 0.5],
    };
    let b = Vertex { p: [1.0 + f32::EPSILON, 2.0, 3.0], ..a };
    let c = Vertex { p: [1.5, 2.0, 3.0], ..a };

    assert_eq!(a, b);
    assert_ne!(a, c);
}
