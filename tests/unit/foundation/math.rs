use super::*;

#[test]
fn fnv1a64_empty_is_offset_basis() {
    assert_eq!(Fnv1a64::new_default().finish(), Fnv1a64::OFFSET_BASIS);
}

#[test]
fn fnv1a64_distinguishes_byte_order() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(&[1, 2]);
    let mut b = Fnv1a64::new_default();
    b.write_bytes(&[2, 1]);
    assert_ne!(a.finish(), b.finish());
}

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(0, 255), 0);
    assert_eq!(mul_div255_u8(128, 255), 128);
}

#[test]
fn premultiply_then_unpremultiply_keeps_opaque_and_clears_transparent() {
    let mut px = vec![10, 20, 30, 255, 200, 100, 50, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[10, 20, 30, 255]);
    assert_eq!(&px[4..], &[0, 0, 0, 0]);

    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[10, 20, 30, 255]);
    assert_eq!(&px[4..], &[0, 0, 0, 0]);
}

#[test]
fn unpremultiply_half_alpha_restores_channel() {
    let mut px = vec![100, 0, 0, 128];
    premultiply_rgba8_in_place(&mut px);
    unpremultiply_rgba8_in_place(&mut px);
    assert!((i32::from(px[0]) - 100).abs() <= 1);
    assert_eq!(px[3], 128);
}
