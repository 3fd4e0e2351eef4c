use layers::{ChoroplethEngine, CountryLayer, GeoFeatureStore, TimeSeriesIndex};
use runtime::timeline::YearObserver;
use scene::World;

/// Year observer that recolors the country layer.
///
/// Borrows the pieces it touches for the duration of one timeline call, so
/// the frame for a year is computed and applied before the call returns.
pub struct ChoroplethBinding<'a> {
    pub engine: &'a mut ChoroplethEngine,
    pub series: &'a TimeSeriesIndex,
    pub features: &'a GeoFeatureStore,
    pub layer: Option<&'a mut CountryLayer>,
    pub world: &'a mut World,
    /// Last year applied through this binding.
    pub applied: Option<i32>,
}

impl YearObserver for ChoroplethBinding<'_> {
    fn year_changed(&mut self, year: i32) {
        let frame = self.engine.map_for_year(self.series, year);
        if let Some(layer) = self.layer.as_deref_mut() {
            layer.apply_frame(self.world, self.features, frame);
        }
        self.applied = Some(year);
    }
}

#[cfg(test)]
mod tests {
    use super::ChoroplethBinding;
    use foundation::time::YearRange;
    use layers::{ChoroplethEngine, ChoroplethStyle, CountryLayer, FeatureId, GeoFeatureStore, TimeSeriesIndex};
    use runtime::timeline::TimelineController;
    use scene::World;
    use scene::prefabs::spawn_globe;

    #[test]
    fn timeline_steps_recolor_the_layer() {
        let mut world = World::new();
        let style = ChoroplethStyle::default();
        let globe = spawn_globe(&mut world, 100.0, style.ocean);
        let features = GeoFeatureStore::from_geojson_str(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "id": "SWE", "properties": {},
                 "geometry": {"type": "Polygon", "coordinates": [[[11,55],[14,55],[14,58],[11,55]]]}},
                {"type": "Feature", "id": "FIN", "properties": {},
                 "geometry": {"type": "Polygon", "coordinates": [[[21,60],[24,60],[24,63],[21,60]]]}}
            ]}"#,
        )
        .expect("features");
        let mut layer = CountryLayer::attach(1, &mut world, globe.root, &features, 100.0, style);
        let mut series = TimeSeriesIndex::new();
        series
            .load_json_str(
                r#"[
                {"iso3": "SWE", "values": [{"year": 2000, "value": 10}, {"year": 2001, "value": 100}]},
                {"iso3": "FIN", "values": [{"year": 2000, "value": 100}, {"year": 2001, "value": 10}]}
            ]"#,
            )
            .expect("series");
        let mut engine = ChoroplethEngine::new(style);
        let mut timeline = TimelineController::new(YearRange::new(2000, 2001), 2000, 1.0);

        let mut binding = ChoroplethBinding {
            engine: &mut engine,
            series: &series,
            features: &features,
            layer: Some(&mut layer),
            world: &mut world,
            applied: None,
        };
        timeline.refresh(&mut binding);
        assert_eq!(binding.applied, Some(2000));
        timeline.step(&mut binding);
        assert_eq!(binding.applied, Some(2001));

        assert_eq!(engine.cached_years(), 2);
        let swe = layer.applied_style(FeatureId(0)).expect("style");
        let fin = layer.applied_style(FeatureId(1)).expect("style");
        assert!(swe.lift > fin.lift);
    }
}
