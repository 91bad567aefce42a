use std::fmt;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::de::DeserializeOwned;
use tracing::{error, info};
use url::Url;

use crate::config::Settings;
use crate::error::ScrapeError;
use crate::fetch::{PageFetcher, StageScope, Transport};
use crate::models::{EnrichedIndex, MenuIndex, Restaurant};
use crate::stages;
use crate::stages::nutrition::Delays;
use crate::store::{CheckpointStore, DataStore, ENRICHED_FILE, MENU_ITEMS_FILE, RESTAURANTS_FILE};
use crate::transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Restaurants,
    MenuItems,
    NutritionDetail,
    Transform,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Restaurants,
        Stage::MenuItems,
        Stage::NutritionDetail,
        Stage::Transform,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Restaurants => "restaurants",
            Stage::MenuItems => "menu_items",
            Stage::NutritionDetail => "nutrition_detail",
            Stage::Transform => "transform",
        }
    }

    /// The stage file this stage reads.
    pub fn input_file(self) -> Option<&'static str> {
        match self {
            Stage::Restaurants => None,
            Stage::MenuItems => Some(RESTAURANTS_FILE),
            Stage::NutritionDetail => Some(MENU_ITEMS_FILE),
            Stage::Transform => Some(ENRICHED_FILE),
        }
    }

    /// The stage file this stage writes. Transform output is timestamped.
    pub fn output_file(self) -> Option<&'static str> {
        match self {
            Stage::Restaurants => Some(RESTAURANTS_FILE),
            Stage::MenuItems => Some(MENU_ITEMS_FILE),
            Stage::NutritionDetail => Some(ENRICHED_FILE),
            Stage::Transform => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Counts over an enriched index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichedCounts {
    pub restaurants: usize,
    pub items: usize,
    pub variations: usize,
    pub failed_items: usize,
}

impl EnrichedCounts {
    pub fn of(index: &EnrichedIndex) -> Self {
        let items = index.values().flat_map(|r| r.items.iter());
        EnrichedCounts {
            restaurants: index.len(),
            items: items.clone().count(),
            variations: stages::nutrition::variation_count(index),
            failed_items: items.filter(|i| i.error.is_some()).count(),
        }
    }
}

impl fmt::Display for EnrichedCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} restaurants, {} items ({} failed), {} serving sizes",
            self.restaurants, self.items, self.failed_items, self.variations
        )
    }
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub counts: EnrichedCounts,
    pub exported: Vec<PathBuf>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scraped {}.", self.counts)?;
        for path in &self.exported {
            write!(f, "\n  exported {}", path.display())?;
        }
        Ok(())
    }
}

/// Runs the stages in order, persisting each result before the next starts.
///
/// `connect` builds a fresh transport for every stage, so no session state
/// crosses a stage boundary.
pub struct Pipeline<C> {
    settings: Settings,
    base: Url,
    store: DataStore,
    connect: C,
}

impl<T, C> Pipeline<C>
where
    T: Transport,
    C: FnMut() -> Result<T>,
{
    pub fn new(settings: Settings, connect: C) -> Result<Self> {
        let base = Url::parse(&settings.base_url).map_err(|e| {
            ScrapeError::Parse(format!("invalid base URL '{}': {}", settings.base_url, e))
        })?;
        let store = DataStore::open(&settings.output_dir)
            .with_context(|| format!("Cannot open {}", settings.output_dir.display()))?;

        Ok(Pipeline {
            settings,
            base,
            store,
            connect,
        })
    }

    fn begin(&mut self, stage: Stage) -> Result<StageScope<T>> {
        let transport = (self.connect)().context("Failed to create HTTP transport")?;
        let fetcher = PageFetcher::new(transport, &self.settings.fetch_config());
        Ok(StageScope::begin(stage.name(), fetcher))
    }

    /// All four stages.
    pub async fn run(&mut self) -> Result<RunSummary> {
        info!("Starting full pipeline against {}", self.base);

        let restaurants = self.restaurants().await?;
        let menus = self.menus(&restaurants).await?;
        let enriched = self.nutrition(menus).await?;

        let exported = if self.settings.normalize_data {
            self.transform(&enriched)?
        } else {
            info!("Normalization disabled, skipping transform");
            Vec::new()
        };

        Ok(RunSummary {
            counts: EnrichedCounts::of(&enriched),
            exported,
        })
    }

    /// One stage on its own, reading the previous stage's file.
    pub async fn run_stage(&mut self, stage: Stage) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        match stage {
            Stage::Restaurants => {
                let restaurants = self.restaurants().await?;
                summary.counts.restaurants = restaurants.len();
            }
            Stage::MenuItems => {
                let restaurants: Vec<Restaurant> = self.load_input(stage)?;
                let restaurants = filter_restaurants(restaurants, &self.settings);
                let menus = self.menus(&restaurants).await?;
                summary.counts.restaurants = menus.len();
                summary.counts.items = menus.values().map(|m| m.items.len()).sum();
            }
            Stage::NutritionDetail => {
                let menus: MenuIndex = self.load_input(stage)?;
                let enriched = self.nutrition(menus).await?;
                summary.counts = EnrichedCounts::of(&enriched);
            }
            Stage::Transform => {
                let enriched: EnrichedIndex = self.load_input(stage)?;
                summary.counts = EnrichedCounts::of(&enriched);
                summary.exported = self.transform(&enriched)?;
            }
        }
        Ok(summary)
    }

    fn load_input<D: DeserializeOwned>(&self, stage: Stage) -> Result<D> {
        let Some(file) = stage.input_file() else {
            bail!("stage {} reads no input", stage);
        };
        if !self.store.exists(file) {
            bail!(
                "{} not found in {}, run the previous stage first",
                file,
                self.store.dir().display()
            );
        }
        Ok(self.store.load_json(file)?)
    }

    /// Stage 1, then the name allow-list and the restaurant cap.
    pub async fn restaurants(&mut self) -> Result<Vec<Restaurant>> {
        let found = {
            let mut scope = self.begin(Stage::Restaurants)?;
            stages::restaurants::scrape(&mut *scope, &self.base)
                .await
                .context("Restaurant listing failed")?
        };

        let restaurants = filter_restaurants(found, &self.settings);
        if restaurants.is_empty() {
            error!("No restaurants found, aborting");
            bail!("no restaurants to scrape");
        }
        info!("Found {} restaurants", restaurants.len());

        self.store.save_json(&restaurants, RESTAURANTS_FILE)?;
        Ok(restaurants)
    }

    /// Stage 2, then the per-restaurant item cap.
    pub async fn menus(&mut self, restaurants: &[Restaurant]) -> Result<MenuIndex> {
        let mut menus = {
            let mut scope = self.begin(Stage::MenuItems)?;
            stages::menus::scrape(&mut *scope, &self.base, restaurants).await
        };

        if let Some(max) = self.settings.max_items_per_restaurant {
            stages::menus::limit_items(&mut menus, max);
        }

        let total: usize = menus.values().map(|m| m.items.len()).sum();
        if total == 0 {
            error!("No menu items found, aborting");
            bail!("no menu items to scrape");
        }
        info!("Found {} total menu items", total);

        self.store.save_json(&menus, MENU_ITEMS_FILE)?;
        Ok(menus)
    }

    /// Stage 3. Checkpointed restaurants are skipped and merged back in
    /// afterwards, ahead of the fresh ones.
    ///
    /// Only checkpoints for restaurants in `menus` are merged. Checkpoints
    /// left over from wider runs stay on disk but are not added, so the
    /// name allow-list and the caps still bound the output.
    pub async fn nutrition(&mut self, mut menus: MenuIndex) -> Result<EnrichedIndex> {
        let checkpoints = CheckpointStore::open(self.settings.checkpoint_dir())?;

        let mut recovered = if self.settings.resume_from_checkpoint {
            checkpoints.load_all()?
        } else {
            EnrichedIndex::new()
        };
        recovered.retain(|name, _| menus.contains_key(name));
        if !recovered.is_empty() {
            info!("Resuming: {} restaurants already checkpointed", recovered.len());
            menus.retain(|name, _| !recovered.contains_key(name));
        }

        let delays = Delays {
            item: self.settings.item_delay(),
            restaurant: self.settings.restaurant_delay(),
        };
        let save_to = self.settings.enable_checkpointing.then_some(&checkpoints);

        let fresh = if menus.is_empty() {
            EnrichedIndex::new()
        } else {
            let mut scope = self.begin(Stage::NutritionDetail)?;
            stages::nutrition::scrape(&mut *scope, &self.base, &menus, delays, save_to).await
        };

        let enriched = merge_checkpoints(recovered, fresh);
        if enriched.is_empty() {
            error!("No nutrition data scraped, aborting");
            bail!("no nutrition data");
        }
        info!("Scraped {}", EnrichedCounts::of(&enriched));

        self.store.save_json(&enriched, ENRICHED_FILE)?;
        Ok(enriched)
    }

    /// Stage 4: normalized collections with a shared timestamp.
    pub fn transform(&self, enriched: &EnrichedIndex) -> Result<Vec<PathBuf>> {
        let now = Utc::now();
        let collections = transform::transform(enriched, now);
        let files = transform::export(&collections, &self.store, now)
            .context("Failed to export normalized data")?;
        info!("Data transformation and export complete");
        Ok(files)
    }
}

/// Name allow-list first, then the count cap. Both keep listing order.
/// A cap of 0 means no cap.
pub fn filter_restaurants(mut restaurants: Vec<Restaurant>, settings: &Settings) -> Vec<Restaurant> {
    if let Some(names) = settings.specific_restaurants.as_ref().filter(|n| !n.is_empty()) {
        let before = restaurants.len();
        restaurants.retain(|r| names.contains(&r.name));
        info!("Filtered to {} of {} restaurants", restaurants.len(), before);
    }
    if let Some(max) = settings.max_restaurants.filter(|&m| m > 0) {
        if restaurants.len() > max {
            restaurants.truncate(max);
            info!("Limited to {} restaurants", max);
        }
    }
    restaurants
}

/// Checkpoint entries first; a fresh entry for the same name is dropped.
pub fn merge_checkpoints(recovered: EnrichedIndex, fresh: EnrichedIndex) -> EnrichedIndex {
    let mut merged = recovered;
    for (name, data) in fresh {
        merged.entry(name).or_insert(data);
    }
    merged
}

/// What the output directory currently holds.
#[derive(Debug, Default)]
pub struct OutputStats {
    pub restaurants: Option<usize>,
    pub menu_items: Option<usize>,
    pub enriched: Option<EnrichedCounts>,
    pub checkpoints: usize,
}

impl OutputStats {
    pub fn collect(settings: &Settings) -> Result<Self> {
        let store = DataStore::open(&settings.output_dir)?;
        let mut stats = OutputStats::default();

        if store.exists(RESTAURANTS_FILE) {
            let list: Vec<Restaurant> = store.load_json(RESTAURANTS_FILE)?;
            stats.restaurants = Some(list.len());
        }
        if store.exists(MENU_ITEMS_FILE) {
            let menus: MenuIndex = store.load_json(MENU_ITEMS_FILE)?;
            stats.menu_items = Some(menus.values().map(|m| m.items.len()).sum());
        }
        if store.exists(ENRICHED_FILE) {
            let enriched: EnrichedIndex = store.load_json(ENRICHED_FILE)?;
            stats.enriched = Some(EnrichedCounts::of(&enriched));
        }
        if settings.checkpoint_dir().is_dir() {
            stats.checkpoints = CheckpointStore::open(settings.checkpoint_dir())?
                .load_all()?
                .len();
        }
        Ok(stats)
    }
}

impl fmt::Display for OutputStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = |n: Option<usize>| n.map_or_else(|| "-".to_string(), |n| n.to_string());
        writeln!(f, "Restaurants:  {}", count(self.restaurants))?;
        writeln!(f, "Menu items:   {}", count(self.menu_items))?;
        match &self.enriched {
            Some(c) => writeln!(f, "Enriched:     {}", c)?,
            None => writeln!(f, "Enriched:     -")?,
        }
        write!(f, "Checkpoints:  {}", self.checkpoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_settings;
    use crate::fetch::testing::MockTransport;
    use crate::models::{EnrichedMenuItem, EnrichedRestaurant, MenuItemRef, RestaurantMenu};
    use crate::store::temp_dir;

    const SITE: &str = "https://fastfoodnutrition.org";

    const LISTING: &str = r#"<html><body>
        <div class="rest_item_list category">
          <div class="filter_target"><a href="/burger-hut">
            <div class="logo_box_text">Burger Hut<span> Nutrition</span></div></a></div>
          <div class="filter_target"><a href="https://fastfoodnutrition.org/burger-hut">
            <div class="logo_box_text">Burger Hut</div></a></div>
        </div></body></html>"#;

    const MENU: &str = r##"<html><body>
        <img class="logo_float" src="/logos/burger-hut.png">
        <div class="category">
          <a class="toggle_category topround nomobileround toggle_div" href="#b"><h2>Burgers</h2></a>
          <ul class="list rest_item_list ab1">
            <li><a href="/burger-hut/classic">Classic</a></li>
            <li><a href="/burger-hut/double">Double</a></li>
          </ul>
        </div>
        <div class="category">
          <a class="toggle_category topround nomobileround toggle_div" href="#d"><h2>Drinks</h2></a>
          <ul class="list rest_item_list ab1">
            <li><a href="/burger-hut/cola">Cola</a></li>
            <li><a href="/burger-hut/shake">Shake</a></li>
          </ul>
        </div></body></html>"##;

    fn item_page(title: &str, calories: u32, dropdown: &str) -> String {
        format!(
            r#"<html><body><h1>{title}</h1>{dropdown}
            <table class="item_nutrition">
              <tr><td>Calories</td><td>{calories}</td><td></td></tr>
              <tr><td>Protein</td><td>{protein}g</td><td>10%</td></tr>
            </table></body></html>"#,
            protein = calories / 20
        )
    }

    fn site() -> MockTransport {
        let shake_sizes = r#"<div class="dropdown-menu">
            <a href="/burger-hut/shake/small">Small</a>
            <a href="/burger-hut/shake/large">Large</a></div>"#;
        MockTransport::new()
            .page(&format!("{SITE}/fast-food-restaurants"), LISTING)
            .page(&format!("{SITE}/burger-hut"), MENU)
            .page(&format!("{SITE}/burger-hut/classic"), item_page("Classic", 540, ""))
            .page(&format!("{SITE}/burger-hut/double"), item_page("Double", 760, ""))
            .page(&format!("{SITE}/burger-hut/cola"), item_page("Cola", 200, ""))
            .page(&format!("{SITE}/burger-hut/shake"), item_page("Shake", 400, shake_sizes))
            .page(&format!("{SITE}/burger-hut/shake/small"), item_page("Shake", 400, ""))
            .page(&format!("{SITE}/burger-hut/shake/large"), item_page("Shake", 800, ""))
    }

    fn files_starting_with(settings: &Settings, prefix: &str) -> usize {
        std::fs::read_dir(&settings.output_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(prefix))
            .count()
    }

    #[tokio::test]
    async fn full_run_over_a_small_site() {
        let settings = test_settings(temp_dir("pipeline_e2e"));
        let mut pipeline = Pipeline::new(settings.clone(), || Ok(site())).unwrap();

        let summary = pipeline.run().await.unwrap();
        assert_eq!(summary.counts.restaurants, 1);
        assert_eq!(summary.counts.items, 4);
        assert_eq!(summary.counts.failed_items, 0);
        assert_eq!(summary.counts.variations, 5);
        assert_eq!(summary.exported.len(), 3);

        let store = DataStore::open(&settings.output_dir).unwrap();
        let restaurants: Vec<Restaurant> = store.load_json(RESTAURANTS_FILE).unwrap();
        assert_eq!(restaurants.len(), 1);
        assert_eq!(restaurants[0].name, "Burger Hut");

        let menus: MenuIndex = store.load_json(MENU_ITEMS_FILE).unwrap();
        let categories: Vec<(&str, &str)> = menus["Burger Hut"]
            .items
            .iter()
            .map(|i| (i.name.as_str(), i.category.as_str()))
            .collect();
        assert_eq!(
            categories,
            [
                ("Classic", "Burgers"),
                ("Double", "Burgers"),
                ("Cola", "Drinks"),
                ("Shake", "Drinks"),
            ]
        );

        let enriched: EnrichedIndex = store.load_json(ENRICHED_FILE).unwrap();
        let shake = &enriched["Burger Hut"].items[3];
        let sizes = &shake.nutritional_values.serving_sizes;
        assert_eq!(sizes.len(), 2);
        assert_eq!(sizes[0].size_label, "Small");
        assert_eq!(sizes[0].nutrition["calories"], "400");
        assert_eq!(sizes[1].size_label, "Large");
        assert_eq!(sizes[1].nutrition["calories"], "800");
        assert_eq!(sizes[1].nutrition["protein"], "40g");

        assert_eq!(files_starting_with(&settings, "menu_item_variations_"), 1);
        assert_eq!(
            std::fs::read_dir(settings.checkpoint_dir()).unwrap().count(),
            1
        );
    }

    #[tokio::test]
    async fn resumed_run_keeps_checkpointed_restaurants_verbatim() {
        let settings = test_settings(temp_dir("pipeline_resume"));

        let checkpointed = EnrichedRestaurant {
            url: format!("{SITE}/taco-bell"),
            restaurant_logo: format!("{SITE}/logos/taco-bell.png"),
            items: vec![EnrichedMenuItem {
                ingredients: "from an earlier run".into(),
                ..EnrichedMenuItem::bare(&MenuItemRef {
                    name: "Crunchy Taco".into(),
                    url: format!("{SITE}/taco-bell/crunchy-taco"),
                    category: "Tacos".into(),
                })
            }],
            error: None,
        };
        CheckpointStore::open(settings.checkpoint_dir())
            .unwrap()
            .save("Taco Bell", &checkpointed);

        let mut menus = MenuIndex::new();
        for (name, slug) in [("Burger Hut", "burger-hut"), ("Taco Bell", "taco-bell")] {
            menus.insert(
                name.to_string(),
                RestaurantMenu {
                    url: format!("{SITE}/{slug}"),
                    items: vec![MenuItemRef {
                        name: "Cola".into(),
                        url: format!("{SITE}/{slug}/cola"),
                        category: "Drinks".into(),
                    }],
                    ..Default::default()
                },
            );
        }

        // Taco Bell pages are not served; fetching them would leave an error.
        let mut pipeline = Pipeline::new(settings, || Ok(site())).unwrap();
        let enriched = pipeline.nutrition(menus).await.unwrap();

        let names: Vec<&str> = enriched.keys().map(String::as_str).collect();
        assert_eq!(names, ["Taco Bell", "Burger Hut"]);
        assert_eq!(enriched["Taco Bell"], checkpointed);
        assert!(enriched["Burger Hut"].items[0].error.is_none());
    }

    #[tokio::test]
    async fn resume_disabled_rescrapes_everything() {
        let mut settings = test_settings(temp_dir("pipeline_no_resume"));
        settings.resume_from_checkpoint = false;
        CheckpointStore::open(settings.checkpoint_dir())
            .unwrap()
            .save("Burger Hut", &EnrichedRestaurant::default());

        let mut menus = MenuIndex::new();
        menus.insert(
            "Burger Hut".into(),
            RestaurantMenu {
                url: format!("{SITE}/burger-hut"),
                items: vec![MenuItemRef {
                    name: "Cola".into(),
                    url: format!("{SITE}/burger-hut/cola"),
                    category: "Drinks".into(),
                }],
                ..Default::default()
            },
        );

        let mut pipeline = Pipeline::new(settings, || Ok(site())).unwrap();
        let enriched = pipeline.nutrition(menus).await.unwrap();
        assert_eq!(enriched["Burger Hut"].variation_count(), 1);
    }

    #[tokio::test]
    async fn empty_listing_aborts_before_writing() {
        let settings = test_settings(temp_dir("pipeline_empty"));
        let connect = || -> Result<MockTransport> {
            Ok(MockTransport::new()
                .page(&format!("{SITE}/fast-food-restaurants"), "<html><body></body></html>"))
        };
        let mut pipeline = Pipeline::new(settings.clone(), connect).unwrap();

        assert!(pipeline.run().await.is_err());
        assert!(!settings.output_dir.join(RESTAURANTS_FILE).exists());
    }

    #[tokio::test]
    async fn stages_run_individually_from_saved_files() {
        let mut settings = test_settings(temp_dir("pipeline_stages"));
        settings.max_items_per_restaurant = Some(1);
        let mut pipeline = Pipeline::new(settings.clone(), || Ok(site())).unwrap();

        assert!(pipeline.run_stage(Stage::NutritionDetail).await.is_err());

        for stage in Stage::ALL {
            pipeline.run_stage(stage).await.unwrap();
        }
        let summary = pipeline.run_stage(Stage::Transform).await.unwrap();
        assert_eq!(summary.counts.items, 1);
        assert_eq!(summary.exported.len(), 3);

        let stats = OutputStats::collect(&settings).unwrap();
        assert_eq!(stats.restaurants, Some(1));
        assert_eq!(stats.menu_items, Some(1));
        assert_eq!(stats.checkpoints, 1);
    }

    #[tokio::test]
    async fn normalization_can_be_switched_off() {
        let mut settings = test_settings(temp_dir("pipeline_no_norm"));
        settings.normalize_data = false;
        let mut pipeline = Pipeline::new(settings.clone(), || Ok(site())).unwrap();

        let summary = pipeline.run().await.unwrap();
        assert!(summary.exported.is_empty());
        assert_eq!(files_starting_with(&settings, "menu_items_"), 0);
        assert!(settings.output_dir.join(ENRICHED_FILE).is_file());
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let mut settings = test_settings(temp_dir("pipeline_bad_url"));
        settings.base_url = "not a url".into();
        assert!(Pipeline::new(settings, || Ok(MockTransport::new())).is_err());
    }

    #[test]
    fn allow_list_applies_before_cap() {
        let mut settings = test_settings(temp_dir("pipeline_filter"));
        let list: Vec<Restaurant> = ["A", "B", "C", "D"]
            .iter()
            .map(|n| Restaurant {
                name: n.to_string(),
                url: format!("https://x/{}", n),
            })
            .collect();

        settings.specific_restaurants = Some(vec!["D".into(), "B".into(), "C".into()]);
        settings.max_restaurants = Some(2);
        let names: Vec<String> = filter_restaurants(list.clone(), &settings)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["B", "C"]);

        settings.specific_restaurants = Some(Vec::new());
        settings.max_restaurants = None;
        assert_eq!(filter_restaurants(list.clone(), &settings).len(), 4);

        settings.max_restaurants = Some(0);
        assert_eq!(filter_restaurants(list, &settings).len(), 4);
    }

    #[test]
    fn checkpoints_win_on_collision() {
        let mut recovered = EnrichedIndex::new();
        recovered.insert("A".into(), EnrichedRestaurant {
            url: "old".into(),
            ..Default::default()
        });
        let mut fresh = EnrichedIndex::new();
        fresh.insert("B".into(), EnrichedRestaurant::default());
        fresh.insert("A".into(), EnrichedRestaurant {
            url: "new".into(),
            ..Default::default()
        });

        let merged = merge_checkpoints(recovered, fresh);
        assert_eq!(merged.keys().collect::<Vec<_>>(), ["A", "B"]);
        assert_eq!(merged["A"].url, "old");
    }

    #[test]
    fn stage_registry_chains_files() {
        for pair in Stage::ALL.windows(2) {
            assert_eq!(pair[0].output_file(), pair[1].input_file());
        }
        assert_eq!(Stage::NutritionDetail.to_string(), "nutrition_detail");
    }
}
