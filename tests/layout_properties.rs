use freshem_profile::columns::column_spans;
use freshem_profile::densify::{densify, DensifyInput, VoxelValue};
use proptest::prelude::*;

const EPS: f64 = 1e-6;

fn arb_values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(prop::sample::select(vec![f64::NAN, 150.0, 300.0, 1500.0]), 1..80)
}

fn arb_sample() -> impl Strategy<Value = (Vec<f64>, Vec<f64>, f64)> {
    (arb_values(), -100.0f64..0.0, 0.05f64..2.0).prop_map(|(values, start, voxel_height)| {
        let depths = (0..values.len()).map(|i| start + i as f64 * voxel_height).collect();
        (depths, values, voxel_height)
    })
}

fn arb_positions() -> impl Strategy<Value = (Vec<f64>, f64)> {
    (prop::collection::vec(0.0f64..=1.0, 1..30), 1.0f64..5000.0).prop_map(|(fractions, total)| {
        let mut positions: Vec<f64> = fractions.into_iter().map(|f| f * total).collect();
        positions.sort_by(f64::total_cmp);
        (positions, total)
    })
}

proptest! {
    // Merging never changes the total height of a stack
    #[test]
    fn densify_conserves_height((depths, values, voxel_height) in arb_sample()) {
        let stack = densify(DensifyInput { depths: &depths, values: &values, voxel_height }).unwrap();
        let total: f64 = stack.block_heights().sum();
        prop_assert!((total - voxel_height * depths.len() as f64).abs() < EPS);
        prop_assert!((total - stack.range.height()).abs() < EPS);
        prop_assert!(stack.block_heights().all(|h| h > 0.0));
    }

    // Neighbouring blocks always hold different values, missing ones included
    #[test]
    fn densify_merges_every_run((depths, values, voxel_height) in arb_sample()) {
        let stack = densify(DensifyInput { depths: &depths, values: &values, voxel_height }).unwrap();
        prop_assert!(stack.blocks.windows(2).all(|pair| !pair[0].value.same_class(&pair[1].value)));

        let runs = 1 + values.windows(2).filter(|pair| !pair[0].same_class(&pair[1])).count();
        prop_assert_eq!(stack.blocks.len(), runs);
    }

    // Spans stay within twice the search distance and never cross a neighbour's half-gap
    #[test]
    fn column_spans_stay_in_their_gap((positions, total) in arb_positions(), search_distance in 0.1f64..500.0) {
        let spans = column_spans(&positions, total, search_distance);
        prop_assert_eq!(spans.len(), positions.len());

        for span in &spans {
            prop_assert!(span.left >= -EPS && span.right >= -EPS);
            prop_assert!(span.left <= 2.0 * search_distance + EPS);
            prop_assert!(span.right <= 2.0 * search_distance + EPS);
        }
        for pair in spans.windows(2) {
            let middle = (pair[0].position + pair[1].position) / 2.0;
            prop_assert!(pair[0].position + pair[0].right <= middle + EPS);
            prop_assert!(pair[1].position - pair[1].left >= middle - EPS);
        }

        let first = &spans[0];
        let last = &spans[spans.len() - 1];
        prop_assert!(first.position - first.left >= -EPS);
        prop_assert!(last.position + last.right <= total + EPS);
    }
}
