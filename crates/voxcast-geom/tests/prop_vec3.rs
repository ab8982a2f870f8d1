use proptest::num::f64::NORMAL;
use proptest::prelude::*;
use proptest::strategy::Strategy;
use voxcast_geom::{Mat3, Vec3};

fn approx(a: f64, b: f64, eps: f64) -> bool { (a - b).abs() <= eps }
fn vapprox(a: Vec3, b: Vec3, eps: f64) -> bool {
    approx(a.x, b.x, eps) && approx(a.y, b.y, eps) && approx(a.z, b.z, eps)
}

fn approx_abs_rel(a: f64, b: f64, atol: f64, rtol: f64) -> bool {
    let diff = (a - b).abs();
    let scale = a.abs().max(b.abs());
    diff <= atol + rtol * scale
}

fn vapprox_abs_rel(a: Vec3, b: Vec3, atol: f64, rtol: f64) -> bool {
    approx_abs_rel(a.x, b.x, atol, rtol)
        && approx_abs_rel(a.y, b.y, atol, rtol)
        && approx_abs_rel(a.z, b.z, atol, rtol)
}

fn bounded_f64() -> impl Strategy<Value = f64> {
    NORMAL.prop_filter("bounded", |v| v.is_finite() && v.abs() <= 1e6)
}

fn bounded_nonzero_f64() -> impl Strategy<Value = f64> {
    NORMAL.prop_filter("bounded_nonzero", |v| v.is_finite() && {
        let a = v.abs();
        a >= 1e-6 && a <= 1e6
    })
}

fn arb_vec3() -> impl Strategy<Value = Vec3> {
    (bounded_f64(), bounded_f64(), bounded_f64())
        .prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn unit_f64() -> impl Strategy<Value = f64> {
    -1.0f64..1.0
}

// Diagonally dominant matrices are always invertible and well conditioned.
fn arb_dominant_mat3() -> impl Strategy<Value = Mat3> {
    proptest::array::uniform9(unit_f64()).prop_map(|v| {
        Mat3::from_rows([
            [v[0] + 4.0, v[1], v[2]],
            [v[3], v[4] + 4.0, v[5]],
            [v[6], v[7], v[8] + 4.0],
        ])
    })
}

proptest! {
    // Addition commutativity: a + b == b + a (element-wise)
    #[test]
    fn vec3_add_commutative(a in arb_vec3(), b in arb_vec3()) {
        prop_assert!(vapprox(a + b, b + a, 1e-9));
    }

    // Normalized length: |normalize(v)| = 1 for non-zero
    #[test]
    fn vec3_normalized_length(
        x in bounded_nonzero_f64(),
        y in bounded_nonzero_f64(),
        z in bounded_nonzero_f64(),
    ) {
        let n = Vec3::new(x, y, z).normalized();
        prop_assert!(approx(n.length(), 1.0, 1e-9));
    }

    // Cross orthogonality: a·(a×b) = 0
    #[test]
    fn vec3_cross_orthogonal(a in arb_vec3(), b in arb_vec3()) {
        let c = a.cross(b);
        let scale = a.length() * c.length();
        prop_assert!(a.dot(c).abs() <= 1e-9 + 1e-9 * scale);
    }

    // Scalar roundtrip: (a * k) / k == a for k != 0
    #[test]
    fn vec3_scalar_roundtrip(a in arb_vec3(), k in bounded_nonzero_f64()) {
        let r = (a * k) / k;
        prop_assert!(vapprox_abs_rel(r, a, 1e-9, 1e-12));
    }

    // Floor cell agrees with per-component floor, including negatives
    #[test]
    fn vec3_floor_cell_matches_floor(x in -1e4f64..1e4, y in -1e4f64..1e4, z in -1e4f64..1e4) {
        let [cx, cy, cz] = Vec3::new(x, y, z).floor_cell();
        prop_assert_eq!(cx, x.floor() as i32);
        prop_assert_eq!(cy, y.floor() as i32);
        prop_assert_eq!(cz, z.floor() as i32);
        prop_assert!((cx as f64) <= x && x < cx as f64 + 1.0);
    }

    // Inverse roundtrip: M^-1 (M v) == v
    #[test]
    fn mat3_inverse_roundtrip(m in arb_dominant_mat3(), v in arb_vec3()) {
        let inv = m.inverse().expect("dominant matrix is invertible");
        let back = inv.mul_vec(m.mul_vec(v));
        prop_assert!(vapprox_abs_rel(back, v, 1e-6, 1e-9));
    }

    // Product with inverse is identity
    #[test]
    fn mat3_inverse_product_identity(m in arb_dominant_mat3()) {
        let inv = m.inverse().expect("dominant matrix is invertible");
        let id = m * inv;
        for r in 0..3 {
            for c in 0..3 {
                let want = if r == c { 1.0 } else { 0.0 };
                prop_assert!(approx(id.rows[r][c], want, 1e-12));
            }
        }
    }
}

#[test]
fn singular_matrix_has_no_inverse() {
    let m = Mat3::from_rows([[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 1.0, 0.0]]);
    assert!(m.inverse().is_none());
}

#[test]
fn identity_is_its_own_inverse() {
    assert_eq!(Mat3::IDENTITY.inverse(), Some(Mat3::IDENTITY));
}
