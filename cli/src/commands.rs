//! Command handlers for the h5vlheap CLI

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, ContentArrangement, Row, Table, presets::UTF8_FULL};
use serde_json::json;

use h5vlheap::{
    GlobalHeapCollection, Hyperslab, ResolveOptions, ResolvedElement, VlStringResolver,
};

use crate::utils::{format_size, parse_list};

#[derive(Args, Debug, Default)]
pub struct ResolveArgs {
    /// Also print each element's string payload
    #[arg(long)]
    pub strings: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Dataset shape, e.g. 4,4 (required for a hyperslab selection)
    #[arg(long, value_name = "D0,D1,...")]
    pub dims: Option<String>,

    /// Hyperslab start per dimension (default: all zeros)
    #[arg(long, value_name = "S0,S1,...", requires = "dims")]
    pub start: Option<String>,

    /// Hyperslab stride per dimension (default: all ones)
    #[arg(long, value_name = "T0,T1,...", requires = "dims")]
    pub stride: Option<String>,

    /// Hyperslab count per dimension (default: the full extent)
    #[arg(long, value_name = "C0,C1,...", requires = "dims")]
    pub count: Option<String>,
}

impl ResolveArgs {
    /// Builds the dataset shape and hyperslab, if `--dims` was given.
    fn selection(&self) -> Result<Option<(Vec<u64>, Hyperslab)>> {
        let Some(dims) = &self.dims else {
            return Ok(None);
        };
        let dims = parse_list(dims).context("invalid --dims")?;
        let mut slab = Hyperslab::all(&dims);
        if let Some(start) = &self.start {
            slab.start = parse_list(start).context("invalid --start")?;
        }
        if let Some(stride) = &self.stride {
            slab.stride = parse_list(stride).context("invalid --stride")?;
        }
        if let Some(count) = &self.count {
            slab.count = parse_list(count).context("invalid --count")?;
        } else if self.start.is_some() || self.stride.is_some() {
            // Default count: as many elements as fit from start with stride.
            slab.count = dims
                .iter()
                .zip(slab.start.iter().zip(&slab.stride))
                .map(|(&d, (&s, &t))| if s >= d || t == 0 { 0 } else { (d - s).div_ceil(t) })
                .collect();
        }
        Ok(Some((dims, slab)))
    }
}

/// Resolve the descriptors at `offset..offset + size` in `file` and print them.
pub fn resolve_dataset(
    file: &str,
    offset: u64,
    size: u64,
    args: &ResolveArgs,
    options: ResolveOptions,
) -> Result<()> {
    let context = || format!("cannot read variable-length string data from '{}'", file);

    let mut resolver = VlStringResolver::open(file).with_context(context)?;
    resolver.options = options;

    let elements = match args.selection()? {
        Some((dims, slab)) => resolver
            .resolve_region_selection(offset, size, &dims, &slab)
            .with_context(context)?,
        None => resolver.resolve_region(offset, size).with_context(context)?,
    };

    let strings = if args.strings {
        Some(resolver.read_strings(&elements).with_context(context)?)
    } else {
        None
    };

    if args.json {
        print_elements_json(&elements, strings.as_deref())?;
    } else {
        print_elements_table(&elements, strings.as_deref());
    }
    Ok(())
}

fn print_elements_json(elements: &[ResolvedElement], strings: Option<&[String]>) -> Result<()> {
    let rows: Vec<_> = elements
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut row = json!({ "element": i, "address": e.address, "length": e.length });
            if let Some(strings) = strings {
                row["string"] = json!(strings[i]);
            }
            row
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn print_elements_table(elements: &[ResolvedElement], strings: Option<&[String]>) {
    if elements.is_empty() {
        println!("No elements.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    let mut header = vec!["#", "Address", "Length"];
    if strings.is_some() {
        header.push("String");
    }
    table.set_header(header);

    for (i, e) in elements.iter().enumerate() {
        let mut row = vec![
            Cell::new(i),
            Cell::new(format!("{:#x}", e.address)),
            Cell::new(e.length),
        ];
        if let Some(strings) = strings {
            row.push(Cell::new(format!("{:?}", strings[i])));
        }
        table.add_row(Row::from(row));
    }
    println!("{table}");

    let total: u64 = elements.iter().map(|e| e.length as u64).sum();
    println!(
        "{} elements, {} of string data",
        elements.len(),
        format_size(total)
    );
}

/// List the objects of the global heap collection at `address` in `file`.
pub fn list_heap(file: &str, address: u64, json: bool, options: ResolveOptions) -> Result<()> {
    let mut resolver = VlStringResolver::open(file)
        .with_context(|| format!("failed to open '{}'", file))?;
    let collection = h5vlheap::read_collection(&mut resolver.reader, address, &options)
        .with_context(|| format!("cannot read global heap at {:#x} in '{}'", address, file))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&collection)?);
        return Ok(());
    }
    print_collection_table(&collection);
    Ok(())
}

fn print_collection_table(collection: &GlobalHeapCollection) {
    println!(
        "Global heap collection at {:#x} (version {}, {})",
        collection.address,
        collection.version,
        format_size(collection.collection_size)
    );
    if collection.objects.is_empty() {
        println!("No objects.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Index", "Refs", "Size", "Payload address"]);
    for obj in &collection.objects {
        table.add_row(Row::from(vec![
            Cell::new(obj.index),
            Cell::new(obj.reference_count),
            Cell::new(obj.size),
            Cell::new(format!("{:#x}", obj.address)),
        ]));
    }
    println!("{table}");

    match collection.free_space {
        Some(free) => println!("Free space: {}", format_size(free)),
        None => println!("Free space: none"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_dims_means_no_selection() {
        let args = ResolveArgs::default();
        assert!(args.selection().unwrap().is_none());
    }

    #[test]
    fn test_selection_defaults_to_full_extent() {
        let args = ResolveArgs {
            dims: Some("4,4".into()),
            ..Default::default()
        };
        let (dims, slab) = args.selection().unwrap().unwrap();
        assert_eq!(dims, vec![4, 4]);
        assert_eq!(slab, Hyperslab::all(&[4, 4]));
    }

    #[test]
    fn test_count_derived_from_start_and_stride() {
        let args = ResolveArgs {
            dims: Some("4,5".into()),
            start: Some("1,0".into()),
            stride: Some("2,2".into()),
            ..Default::default()
        };
        let (_, slab) = args.selection().unwrap().unwrap();
        assert_eq!(slab.count, vec![2, 3]);
        assert_eq!(slab.element_indices(&[4, 5]).unwrap(), vec![5, 7, 9, 15, 17, 19]);
    }

    #[test]
    fn test_explicit_count() {
        let args = ResolveArgs {
            dims: Some("4,4".into()),
            count: Some("2,2".into()),
            ..Default::default()
        };
        let (_, slab) = args.selection().unwrap().unwrap();
        assert_eq!(slab.start, vec![0, 0]);
        assert_eq!(slab.count, vec![2, 2]);
    }
}
