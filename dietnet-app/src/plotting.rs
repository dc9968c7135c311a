//! This module renders the comparison visuals: the clustered similarity
//! heatmap and the hierarchical-clustering dendrogram for each pattern.

use anyhow::Result;
use dietnet_core::compare::cluster::Clustering;
use dietnet_core::compare::patterns::Pattern;
use dietnet_core::compare::similarity::SimilarityMatrix;
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

/// Maps a similarity in [0, 1] onto a viridis-like ramp.
fn similarity_color(value: f64) -> RGBColor {
    let v = value.clamp(0.0, 1.0);
    let stops: [(f64, (u8, u8, u8)); 3] = [
        (0.0, (68, 1, 84)),
        (0.5, (33, 145, 140)),
        (1.0, (253, 231, 37)),
    ];
    let (start, end, t) = if v < 0.5 {
        (stops[0].1, stops[1].1, v / 0.5)
    } else {
        (stops[1].1, stops[2].1, (v - 0.5) / 0.5)
    };
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(lerp(start.0, end.0), lerp(start.1, end.1), lerp(start.2, end.2))
}

/// Index of the sample labeling the y band containing coordinate `v`. Row
/// `i` of the matrix is drawn into the band `[n-1-i, n-i]` so the first
/// sample sits at the top; the tick labels must invert that flip.
fn flipped_row_index(n: usize, v: f64) -> Option<usize> {
    let band = v.floor() as usize;
    if band >= n {
        return None;
    }
    Some(n - 1 - band)
}

/// Draws the clustered similarity heatmap for one pattern.
pub fn plot_heatmap(output_dir: &Path, pattern: Pattern, matrix: &SimilarityMatrix) -> Result<()> {
    let n = matrix.n();
    if n == 0 {
        info!(pattern = pattern.display_name(), "no samples; skipping heatmap");
        return Ok(());
    }

    let path = output_dir.join(format!("{}_GraphComparisons_Heatmap.png", pattern.file_stem()));
    let root = BitMapBackend::new(&path, (1024, 900)).into_drawing_area();
    root.fill(&WHITE)?;

    let caption = format!("Clustered Jaccard Similarity Heatmap: {}", pattern);
    let labels = matrix.labels.clone();
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 40).into_font())
        .margin(10)
        .x_label_area_size(120)
        .y_label_area_size(120)
        .build_cartesian_2d(0f64..n as f64, 0f64..n as f64)?;

    let x_labels = labels.clone();
    let y_labels = labels;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n)
        .y_labels(n)
        .x_label_formatter(&move |v| {
            x_labels
                .get(v.floor() as usize)
                .cloned()
                .unwrap_or_default()
        })
        .y_label_formatter(&move |v| {
            flipped_row_index(y_labels.len(), *v)
                .and_then(|i| y_labels.get(i).cloned())
                .unwrap_or_default()
        })
        .draw()?;

    chart.draw_series((0..n).flat_map(|i| {
        let row = &matrix.values[i];
        (0..n).map(move |j| {
            let color = similarity_color(row[j]);
            Rectangle::new(
                [(j as f64, (n - 1 - i) as f64), (j as f64 + 1.0, (n - i) as f64)],
                color.filled(),
            )
        })
    }))?;

    root.present()?;
    info!(path = %path.display(), "saved heatmap");
    Ok(())
}

/// Draws the dendrogram for one pattern. Skipped (with an info event) when
/// there is nothing to cluster.
pub fn plot_dendrogram(
    output_dir: &Path,
    pattern: Pattern,
    clustering: &Clustering,
    labels: &[String],
) -> Result<()> {
    if clustering.merges.is_empty() {
        info!(
            pattern = pattern.display_name(),
            n = clustering.n_leaves,
            "not enough samples to produce dendrogram"
        );
        return Ok(());
    }

    let path = output_dir.join(format!(
        "{}_GraphComparisons_Dendrogram.png",
        pattern.file_stem()
    ));
    let root = BitMapBackend::new(&path, (1024, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let n = clustering.n_leaves;
    let max_height = clustering.max_height().max(f64::MIN_POSITIVE);

    let caption = format!("Hierarchical Clustering Dendrogram: {}", pattern);
    let ordered_labels: Vec<String> = clustering
        .leaf_order
        .iter()
        .map(|&i| labels[i].clone())
        .collect();
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 30).into_font())
        .margin(20)
        .x_label_area_size(100)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..n as f64, 0f64..max_height * 1.1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&move |v| {
            ordered_labels
                .get(v.floor() as usize)
                .cloned()
                .unwrap_or_default()
        })
        .y_desc("Distance (1 - Jaccard)")
        .draw()?;

    // X position of each cluster id: leaves sit at their ordered slot,
    // merged clusters at the midpoint of their children.
    let mut x_pos = vec![0.0; n + clustering.merges.len()];
    let mut height_of = vec![0.0; n + clustering.merges.len()];
    for (slot, &leaf) in clustering.leaf_order.iter().enumerate() {
        x_pos[leaf] = slot as f64 + 0.5;
    }

    for (step, merge) in clustering.merges.iter().enumerate() {
        let id = n + step;
        let (xl, xr) = (x_pos[merge.left], x_pos[merge.right]);
        let (hl, hr) = (height_of[merge.left], height_of[merge.right]);
        x_pos[id] = (xl + xr) / 2.0;
        height_of[id] = merge.height;

        chart.draw_series(std::iter::once(PathElement::new(
            vec![
                (xl, hl),
                (xl, merge.height),
                (xr, merge.height),
                (xr, hr),
            ],
            BLUE.stroke_width(2),
        )))?;
    }

    root.present()?;
    info!(path = %path.display(), "saved dendrogram");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn y_ticks_follow_the_flipped_row_order() {
        // Row 0 renders in the top band [n-1, n), so the top tick must name
        // the first sample and the bottom tick the last.
        assert_eq!(flipped_row_index(2, 1.5), Some(0));
        assert_eq!(flipped_row_index(2, 0.0), Some(1));
        assert_eq!(flipped_row_index(3, 2.0), Some(0));
        assert_eq!(flipped_row_index(2, 2.0), None);
        assert_eq!(flipped_row_index(0, 0.0), None);
    }

    #[test]
    fn color_ramp_endpoints() {
        assert_eq!(similarity_color(0.0), RGBColor(68, 1, 84));
        assert_eq!(similarity_color(1.0), RGBColor(253, 231, 37));
        // Out-of-range values clamp instead of wrapping.
        assert_eq!(similarity_color(2.0), RGBColor(253, 231, 37));
    }
}
