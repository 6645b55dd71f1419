use std::{
    io::{self, Write},
    path::PathBuf,
};

use clap::{Args, Subcommand};
use griya::{
    catalog::{Catalog, GoodsFilter, PriceRange, VenueFilter},
    pricing::{format_idr, price_label},
};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};

#[derive(Debug, Args)]
pub(crate) struct CatalogCommand {
    /// Catalog YAML file; the bundled catalog when omitted
    #[arg(long, env = "GRIYA_CATALOG")]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: CatalogSubcommand,
}

#[derive(Debug, Subcommand)]
enum CatalogSubcommand {
    /// List ceremonial offerings
    Goods(GoodsArgs),

    /// List venues
    Venues(VenuesArgs),

    /// List officiants
    Officiants(OfficiantsArgs),
}

#[derive(Debug, Args)]
struct GoodsArgs {
    /// Name search
    #[arg(long, default_value = "")]
    search: String,

    /// Category
    #[arg(long)]
    category: Option<String>,

    /// Sub-category
    #[arg(long)]
    subcategory: Option<String>,

    /// Lowest price
    #[arg(long, default_value_t = 0)]
    min_price: i64,

    /// Highest price
    #[arg(long)]
    max_price: Option<i64>,
}

#[derive(Debug, Args)]
struct VenuesArgs {
    /// Name or location search
    #[arg(long, default_value = "")]
    search: String,

    /// Location
    #[arg(long)]
    location: Option<String>,

    /// Lowest base price
    #[arg(long, default_value_t = 0)]
    min_price: i64,

    /// Highest base price
    #[arg(long)]
    max_price: Option<i64>,
}

#[derive(Debug, Args)]
struct OfficiantsArgs {
    /// Name or religious house search
    #[arg(long, default_value = "")]
    search: String,
}

pub(crate) fn run(command: CatalogCommand) -> Result<(), String> {
    let catalog = match &command.catalog {
        Some(path) => Catalog::from_path(path),
        None => Catalog::bundled(),
    }
    .map_err(|error| format!("failed to load catalog: {error}"))?;

    let table = match command.command {
        CatalogSubcommand::Goods(args) => goods_table(&catalog, args),
        CatalogSubcommand::Venues(args) => venues_table(&catalog, args),
        CatalogSubcommand::Officiants(args) => officiants_table(&catalog, &args),
    };

    writeln!(io::stdout().lock(), "{table}").map_err(|error| format!("failed to write: {error}"))
}

fn goods_table(catalog: &Catalog, args: GoodsArgs) -> String {
    let filter = GoodsFilter {
        search: args.search,
        category: args.category,
        subcategory: args.subcategory,
        price: PriceRange {
            min: args.min_price,
            max: args.max_price,
        },
    };

    let mut builder = Builder::default();
    builder.push_record(["ID", "Nama", "Kategori", "Sub", "Harga"]);

    for good in catalog.find_goods(&filter) {
        builder.push_record([
            good.id.to_string(),
            good.name.clone(),
            good.category.clone(),
            good.subcategory.clone().unwrap_or_default(),
            format_idr(good.price),
        ]);
    }

    render(builder, 4..5)
}

fn venues_table(catalog: &Catalog, args: VenuesArgs) -> String {
    let filter = VenueFilter {
        search: args.search,
        location: args.location,
        price: PriceRange {
            min: args.min_price,
            max: args.max_price,
        },
    };

    let mut builder = Builder::default();
    builder.push_record(["ID", "Nama", "Lokasi", "Kapasitas", "Harga", "Catering/pax"]);

    for venue in catalog.find_venues(&filter) {
        builder.push_record([
            venue.id.to_string(),
            venue.name.clone(),
            venue.location.clone(),
            venue.capacity.clone(),
            format_idr(venue.price),
            format_idr(venue.catering_price),
        ]);
    }

    render(builder, 4..6)
}

fn officiants_table(catalog: &Catalog, args: &OfficiantsArgs) -> String {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Nama", "Griya", "Wilayah", "Status", "Punia"]);

    for officiant in catalog.find_officiants(&args.search) {
        builder.push_record([
            officiant.id.to_string(),
            officiant.name.clone(),
            officiant.house.clone(),
            officiant.region.to_string(),
            officiant.availability.clone(),
            price_label(0),
        ]);
    }

    render(builder, 5..6)
}

fn render(builder: Builder, amounts: std::ops::Range<usize>) -> String {
    let mut table = builder.build();

    table.with(Theme::from(Style::modern_rounded()));
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(amounts), Alignment::right());

    table.to_string()
}
