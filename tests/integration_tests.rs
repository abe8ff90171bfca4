//! Integration tests for the dependence analysis pipeline.

use loopdep::prelude::*;
use loopdep::analyze;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn l(n: u32) -> LoopId {
    LoopId(n)
}

#[test]
fn test_stencil_pipeline() {
    init_logging();
    // for i { A[i] = A[i-1] + 1; }
    let nest = LoopNest::new(vec![l(1)]);
    let a = intern("A");
    let write = DataReference::write(StmtId::new(0), a, vec![Chrec::affine(l(1), 0, 1)]);
    let read = DataReference::read(StmtId::new(0), a, vec![Chrec::affine(l(1), -1, 1)]);

    let result = analyze(&[write, read], &nest).expect("analysis failed");
    let deps = result.dependences();
    assert!(!deps.is_empty());

    // The flow dependence has distance 1 and is carried by the loop.
    let flow: Vec<_> = result
        .graph
        .edges
        .iter()
        .filter(|e| e.kind == DependenceKind::Flow)
        .collect();
    assert_eq!(flow.len(), 1);
    assert_eq!(
        flow[0].relation.distances.as_ref().unwrap(),
        &[DistanceEntry::Exact(1)]
    );
    // The output self-dependence and the flow dependence disagree on the
    // distance, so the merged statement-level answer is unknown.
    assert_eq!(
        result
            .graph
            .distance_between(StmtId::new(0), StmtId::new(0), l(1)),
        Some(DistanceEntry::Unknown)
    );
    assert!(!result.graph.is_parallelizable(l(1)));
}

#[test]
fn test_matmul_nest() {
    init_logging();
    // for i { for j { for k { C[i][j] = C[i][j] + A[i][k] * B[k][j]; } } }
    let nest = LoopNest::new(vec![l(1), l(2), l(3)]);
    let c = intern("C");
    let a = intern("A");
    let b = intern("B");
    let s = StmtId::new(0);

    let refs = vec![
        DataReference::write(s, c, vec![Chrec::affine(l(1), 0, 1), Chrec::affine(l(2), 0, 1)]),
        DataReference::read(s, c, vec![Chrec::affine(l(1), 0, 1), Chrec::affine(l(2), 0, 1)]),
        DataReference::read(s, a, vec![Chrec::affine(l(1), 0, 1), Chrec::affine(l(3), 0, 1)]),
        DataReference::read(s, b, vec![Chrec::affine(l(3), 0, 1), Chrec::affine(l(2), 0, 1)]),
    ];

    let result = analyze(&refs, &nest).expect("analysis failed");

    // The reduction on C is carried by the innermost loop only.
    assert!(result.graph.is_parallelizable(l(1)));
    assert!(result.graph.is_parallelizable(l(2)));
    assert!(!result.graph.is_parallelizable(l(3)));

    let flow: Vec<_> = result
        .graph
        .edges
        .iter()
        .filter(|e| e.kind == DependenceKind::Flow)
        .collect();
    assert_eq!(flow.len(), 1);
    assert_eq!(
        flow[0].relation.distances.as_ref().unwrap(),
        &[
            DistanceEntry::Exact(0),
            DistanceEntry::Exact(0),
            DistanceEntry::Exact(1)
        ]
    );
}

#[test]
fn test_gcd_independence() {
    init_logging();
    // for i { A[2i] = A[2i+1]; } touches even and odd elements only.
    let nest = LoopNest::new(vec![l(1)]);
    let a = intern("A");
    let write = DataReference::write(StmtId::new(0), a, vec![Chrec::affine(l(1), 0, 2)]);
    let read = DataReference::read(StmtId::new(0), a, vec![Chrec::affine(l(1), 1, 2)]);

    let result = analyze(&[write, read], &nest).expect("analysis failed");
    // Only the write-write self pair survives.
    assert!(result
        .relations
        .iter()
        .filter(|r| r.ref_a.is_write() != r.ref_b.is_write())
        .all(|r| r.verdict == Verdict::Independent));
    assert!(result.graph.is_parallelizable(l(1)));
}

#[test]
fn test_siv_constant_subscript() {
    init_logging();
    // A[12] written in the loop, A[10 + 2i] read: they meet at i = 1.
    let nest = LoopNest::new(vec![l(1)]);
    let a = intern("A");
    let write = DataReference::write(StmtId::new(0), a, vec![Chrec::int(12)]);
    let read = DataReference::read(StmtId::new(1), a, vec![Chrec::affine(l(1), 10, 2)]);

    let result = analyze(&[write.clone(), read], &nest).expect("analysis failed");
    assert!(result
        .graph
        .has_dependence(StmtId::new(0), StmtId::new(1)));

    // With step 3 the subscripts never meet: 3 does not divide 2.
    let read3 = DataReference::read(StmtId::new(1), a, vec![Chrec::affine(l(1), 10, 3)]);
    let result = analyze(&[write, read3], &nest).expect("analysis failed");
    assert!(!result
        .graph
        .has_dependence(StmtId::new(0), StmtId::new(1)));
}

#[test]
fn test_coupled_subscripts() {
    init_logging();
    // T[i+1][i] vs T[i][i] can never touch the same element.
    let nest = LoopNest::new(vec![l(1)]);
    let t = intern("T");
    let write = DataReference::write(
        StmtId::new(0),
        t,
        vec![Chrec::affine(l(1), 1, 1), Chrec::affine(l(1), 0, 1)],
    );
    let read = DataReference::read(
        StmtId::new(1),
        t,
        vec![Chrec::affine(l(1), 0, 1), Chrec::affine(l(1), 0, 1)],
    );

    let result = analyze(&[write, read], &nest).expect("analysis failed");
    assert!(!result
        .graph
        .has_dependence(StmtId::new(0), StmtId::new(1)));
}

#[test]
fn test_interchange_and_skew() {
    init_logging();
    // for i { for j { A[i][j] = A[i-1][j+1]; } }: distance (1, -1).
    let nest = LoopNest::new(vec![l(1), l(2)]);
    let a = intern("A");
    let write = DataReference::write(
        StmtId::new(0),
        a,
        vec![Chrec::affine(l(1), 0, 1), Chrec::affine(l(2), 0, 1)],
    );
    let read = DataReference::read(
        StmtId::new(0),
        a,
        vec![Chrec::affine(l(1), -1, 1), Chrec::affine(l(2), 1, 1)],
    );

    let result = analyze(&[write, read], &nest).expect("analysis failed");
    assert!(!is_interchange_legal(&result.graph, 0, 1));

    // Skewing the inner loop by the outer one repairs the distance.
    let skew = TransformMatrix::from_rows(vec![vec![1, 0], vec![1, 1]]);
    assert!(is_transform_legal(&skew, &result.graph));
    let interchange = TransformMatrix::from_rows(vec![vec![0, 1], vec![1, 0]]);
    assert!(!is_transform_legal(&interchange, &result.graph));
}

#[test]
fn test_chrec_evaluation() {
    // {5, +, {3, +, 4}_1}_1 follows the Newton series.
    let chrec = Chrec::polynomial(
        l(1),
        Chrec::int(5),
        Chrec::polynomial(l(1), Chrec::int(3), Chrec::int(4)),
    );
    assert_eq!(
        evaluate(l(1), &chrec, &Chrec::int(10)),
        Chrec::int(5 + 3 * 10 + 4 * 45)
    );

    // Folding two affine chrecs raises the degree.
    let p = fold_multiply(&Chrec::affine(l(1), 1, 2), &Chrec::affine(l(1), 3, 4));
    assert_eq!(evaluate(l(1), &p, &Chrec::int(3)), Chrec::int(7 * 15));
}

#[test]
fn test_algebra_round_trips() {
    // Bezout identity for (12, 8).
    let bz = bezout(12, 8);
    assert_eq!(bz.gcd, 4);
    assert_eq!(bz.u11 * 12 + bz.u12 * 8, 4);

    // M * adj(M) = det(M) * I.
    let m = IntMatrix::from_vec(vec![vec![2, 1, 0], vec![1, 3, 1], vec![0, 1, 2]]);
    let (det, inv) = matrix_inverse(&m, 3);
    let product = m.multiply(&inv);
    for i in 0..3 {
        for j in 0..3 {
            assert_eq!(product.get(i, j), if i == j { det } else { 0 });
        }
    }

    // H = U * M with H lower triangular.
    let (h, u) = matrix_hermite(&m, 3);
    assert_eq!(u.multiply(&m), h);
    for i in 0..3 {
        for j in (i + 1)..3 {
            assert_eq!(h.get(i, j), 0);
        }
    }
}
