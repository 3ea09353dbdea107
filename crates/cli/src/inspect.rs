use modroute_api::ResolverError;
use modroute_core::{Resolver, ResolverRegistry};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct SearchPathRow {
    #[tabled(rename = "Module")]
    module: String,
    #[tabled(rename = "Precedence")]
    precedence: i64,
    #[tabled(rename = "Root")]
    root: String,
}

#[derive(Tabled)]
struct RouteRow {
    #[tabled(rename = "Route")]
    route: String,
    #[tabled(rename = "Ext")]
    ext: String,
    #[tabled(rename = "Module")]
    module: String,
    #[tabled(rename = "Path")]
    path: String,
}

fn resolver<'a>(
    registry: &'a mut ResolverRegistry,
    name: &str,
) -> Result<&'a mut Resolver, ResolverError> {
    registry
        .get_resolver_mut(name)
        .ok_or_else(|| ResolverError::UnknownResolverType {
            name: name.to_string(),
        })
}

pub fn search_path(
    registry: &mut ResolverRegistry,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let entries = resolver(registry, name)?
        .as_module_resolver_mut()
        .search_path();

    if entries.is_empty() {
        println!("Resolver {name} has no modules.");
        return Ok(());
    }

    let rows: Vec<SearchPathRow> = entries
        .into_iter()
        .map(|entry| SearchPathRow {
            module: entry.module,
            precedence: entry.precedence,
            root: entry.root.display().to_string(),
        })
        .collect();
    println!("{}", Table::new(rows));
    Ok(())
}

pub fn routes(
    registry: &mut ResolverRegistry,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let router = resolver(registry, name)?
        .as_routes_mut()
        .ok_or_else(|| ResolverError::Config(format!("resolver {name} does not route requests")))?;

    let rows: Vec<RouteRow> = router
        .routes()
        .walk()
        .into_iter()
        .map(|binding| RouteRow {
            route: binding.route_prefix.clone(),
            ext: binding.extension.to_string(),
            module: binding.module.clone(),
            path: binding.path.display().to_string(),
        })
        .collect();

    if rows.is_empty() {
        println!("Resolver {name} has no routes.");
    } else {
        println!("{}", Table::new(rows));
    }
    Ok(())
}
