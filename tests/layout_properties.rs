use mekko_rs::error::{LayoutError, TotalScope};
use mekko_rs::input::{distinct_categories, parse_records};
use mekko_rs::layout::layout;
use mekko_rs::{CategoryColorMap, Record};

const EPS: f64 = 1e-9;

fn sample() -> Vec<Record> {
    let csv = "\
Tokyo,Food,120
Tokyo,Drinks,80
Tokyo,Goods,40
Osaka,Food,60
Osaka,Drinks,90
Nagoya,Goods,25
Nagoya,Food,5
";
    parse_records(csv.as_bytes()).expect("valid csv")
}

fn colors_for(records: &[Record]) -> CategoryColorMap {
    CategoryColorMap::default_for(distinct_categories(records))
}

#[test]
fn group_widths_cover_unit_interval() {
    let records = sample();
    let out = layout(&records, &colors_for(&records)).unwrap();

    let spans = out.partition.spans();
    assert_eq!(spans.len(), 3);
    assert!(spans[0].x_start.abs() < EPS);
    for pair in spans.windows(2) {
        assert!((pair[0].x_end() - pair[1].x_start).abs() < EPS);
    }
    let last = spans.last().unwrap();
    assert!((last.x_end() - 1.0).abs() < EPS);

    let total: f64 = out.groups.iter().map(|g| g.global_ratio).sum();
    assert!((total - 1.0).abs() < EPS);
    assert!((out.grand_total - 420.0).abs() < EPS);
}

#[test]
fn segments_stack_to_full_height_in_every_group() {
    let records = sample();
    let out = layout(&records, &colors_for(&records)).unwrap();

    for span in out.partition.spans() {
        let rects: Vec<_> = out.rectangles_in(&span.group).collect();
        assert!(!rects.is_empty());
        assert!(rects[0].y_bottom.abs() < EPS);
        for pair in rects.windows(2) {
            assert!((pair[0].y_top() - pair[1].y_bottom).abs() < EPS);
        }
        let height: f64 = rects.iter().map(|r| r.height).sum();
        assert!((height - 1.0).abs() < EPS, "{}: {height}", span.group);
        for r in rects {
            assert!((r.x - span.x_start).abs() < EPS);
            assert!((r.width - span.width).abs() < EPS);
        }
    }
}

#[test]
fn rectangle_area_is_share_of_grand_total() {
    let records = sample();
    let out = layout(&records, &colors_for(&records)).unwrap();
    let tokyo_food = out
        .rectangles
        .iter()
        .find(|r| r.group == "Tokyo" && r.label == "Food")
        .unwrap();
    assert!((tokyo_food.width * tokyo_food.height - 120.0 / 420.0).abs() < EPS);
    assert_eq!(tokyo_food.display_text, "Food\n(50.0%)");
}

#[test]
fn layout_is_deterministic_and_order_independent() {
    let records = sample();
    let colors = colors_for(&records);
    let a = layout(&records, &colors).unwrap();
    let b = layout(&records, &colors).unwrap();
    assert_eq!(a, b);

    let mut reversed = records.clone();
    reversed.reverse();
    let c = layout(&reversed, &colors_for(&reversed)).unwrap();
    assert_eq!(a, c);
}

#[test]
fn rectangles_carry_palette_colors() {
    let records = sample();
    let mut colors = colors_for(&records);
    colors.insert("Drinks", "#000000".parse().unwrap());
    let out = layout(&records, &colors).unwrap();
    for r in &out.rectangles {
        assert_eq!(r.color, colors.resolve(&r.label));
    }
}

#[test]
fn zero_valued_group_is_degenerate() {
    let records = vec![
        Record::new("A", "x", 3.0),
        Record::new("B", "x", 0.0),
        Record::new("B", "y", 0.0),
    ];
    let err = layout(&records, &CategoryColorMap::new()).unwrap_err();
    assert_eq!(
        err,
        LayoutError::DegenerateTotals {
            scope: TotalScope::Group("B".into()),
            total: 0.0
        }
    );
}
