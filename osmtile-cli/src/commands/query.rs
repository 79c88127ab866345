//! Region query command.

use std::path::PathBuf;

use clap::Args;
use osmtile::model::FeatureCollection;
use osmtile::{RegionResult, TileCache};

use super::common::{resolve_config, CacheArgs, RegionArgs};
use crate::error::CliError;

/// Arguments for `osmtile query`.
#[derive(Debug, Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub region: RegionArgs,

    #[command(flatten)]
    pub cache: CacheArgs,
}

/// Fetch (or load from cache) the region and print a summary.
pub fn run(config_path: Option<&PathBuf>, args: QueryArgs) -> Result<(), CliError> {
    let config = resolve_config(config_path, &args.cache)?;
    let cache = TileCache::new(config).map_err(CliError::CacheCreation)?;

    let RegionArgs { lat, lon, radius } = args.region;
    let result = cache
        .get_merged_data(lat, lon, radius)
        .map_err(CliError::Query)?;

    print!("{}", summary(lat, lon, radius, &result));
    Ok(())
}

fn summary(lat: f64, lon: f64, radius: f64, result: &RegionResult) -> String {
    format!(
        "Region {}, {} (radius {} m, zone {}, {} tiles)\n  \
         Graph: {} nodes, {} edges\n  \
         Water: {}\n  \
         Parks: {}\n",
        lat,
        lon,
        radius,
        result.zone,
        result.tiles.len(),
        result.graph.node_count(),
        result.graph.edge_count(),
        feature_count(result.water.as_ref()),
        feature_count(result.parks.as_ref()),
    )
}

fn feature_count(features: Option<&FeatureCollection>) -> String {
    match features {
        Some(f) => format!("{} features", f.len()),
        None => "none".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osmtile::coord::{Hemisphere, ZoneId};
    use osmtile::model::RoadGraph;
    use osmtile::tile::TileIndex;

    #[test]
    fn test_summary_reports_missing_features_as_none() {
        let result = RegionResult {
            graph: RoadGraph::new(),
            water: None,
            parks: Some(FeatureCollection::default()),
            zone: ZoneId {
                number: 18,
                hemisphere: Hemisphere::North,
            },
            tiles: vec![TileIndex::new(585, 4428)],
        };

        let text = summary(40.0, -74.0, 200.0, &result);
        assert!(text.contains("zone 18N, 1 tiles"));
        assert!(text.contains("Graph: 0 nodes, 0 edges"));
        assert!(text.contains("Water: none"));
        assert!(text.contains("Parks: 0 features"));
    }
}
