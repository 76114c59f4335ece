use crate::core::{FGBuilderError, Factor, VariableId};
use ndarray::{ArrayD, IxDyn};

fn table(shape: &[usize], values: Vec<f64>) -> ArrayD<f64> {
    ArrayD::from_shape_vec(IxDyn(shape), values).unwrap()
}

#[test]
fn factor_validation() {
    let (a, b) = (VariableId(0), VariableId(1));
    assert_eq!(
        Factor::new(vec![a, a], table(&[2, 2], vec![1.; 4])),
        Err(FGBuilderError::DuplicateScopeVariable(a))
    );
    assert_eq!(
        Factor::new(vec![a, b], table(&[2], vec![1.; 2])),
        Err(FGBuilderError::ShapeMismatch {
            scope: vec![a, b],
            shape: vec![2]
        })
    );
    assert_eq!(
        Factor::new(vec![a], table(&[2], vec![0.5, -0.1])),
        Err(FGBuilderError::InvalidWeight(-0.1))
    );
    assert!(matches!(
        Factor::new(vec![a], table(&[2], vec![0.5, f64::NAN])),
        Err(FGBuilderError::InvalidWeight(_))
    ));
    assert_eq!(
        Factor::new(vec![a], table(&[0], vec![])),
        Err(FGBuilderError::EmptyDomain(a))
    );
    let factor = Factor::new(vec![a, b], table(&[2, 3], vec![0., 1., 2., 3., 4., 5.])).unwrap();
    assert_eq!(factor.size(), 6);
    assert_eq!(factor.value(&[1, 2]), Some(5.));
    assert_eq!(factor.value(&[2, 0]), None);
    assert_eq!(factor.value(&[1]), None);
    assert_eq!(factor.total(), 15.);
}

#[test]
fn product_over_union_scope() {
    let (a, b, c) = (VariableId(0), VariableId(1), VariableId(2));
    // f(a, b) = 1 + a + 10 * b, g(c, b) = 1 + c * b
    let f = Factor::from_fn(vec![a, b], &[2, 3], |x| (1 + x[0] + 10 * x[1]) as f64).unwrap();
    let g = Factor::from_fn(vec![c, b], &[2, 3], |x| (1 + x[0] * x[1]) as f64).unwrap();
    let fg = Factor::product(&[&f, &g]);
    assert_eq!(fg.scope(), &[a, b, c]);
    assert_eq!(fg.shape(), &[2, 3, 2]);
    for x_a in 0..2 {
        for x_b in 0..3 {
            for x_c in 0..2 {
                let expected = (1 + x_a + 10 * x_b) as f64 * (1 + x_c * x_b) as f64;
                assert_eq!(fg.value(&[x_a, x_b, x_c]), Some(expected));
            }
        }
    }
    assert_eq!(Factor::product_size(&[&f, &g]), Some(12));
    // the inputs are left untouched
    assert_eq!(f.scope(), &[a, b]);
    assert_eq!(g.value(&[1, 2]), Some(3.));
}

#[test]
fn product_of_nothing_is_the_unit_scalar() {
    let unit = Factor::product(&[]);
    assert!(unit.scope().is_empty());
    assert_eq!(unit.value(&[]), Some(1.));
}

#[test]
fn sum_out_and_clamp() {
    let (a, b) = (VariableId(3), VariableId(7));
    let f = Factor::new(vec![a, b], table(&[2, 3], vec![1., 2., 3., 4., 5., 6.])).unwrap();

    let over_b = f.sum_out(a);
    assert_eq!(over_b.scope(), &[b]);
    assert_eq!(over_b.table().iter().copied().collect::<Vec<_>>(), vec![5., 7., 9.]);

    let over_a = f.sum_out(b);
    assert_eq!(over_a.scope(), &[a]);
    assert_eq!(over_a.table().iter().copied().collect::<Vec<_>>(), vec![6., 15.]);

    let scalar = over_a.sum_out(a);
    assert!(scalar.scope().is_empty());
    assert_eq!(scalar.total(), 21.);

    assert_eq!(f.sum_out(VariableId(100)), f);

    let clamped = f.clamp(b, 1);
    assert_eq!(clamped.scope(), f.scope());
    assert_eq!(
        clamped.table().iter().copied().collect::<Vec<_>>(),
        vec![0., 2., 0., 0., 5., 0.]
    );
    assert_eq!(f.clamp(VariableId(100), 0), f);
}
