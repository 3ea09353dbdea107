use modroute_core::ResolverRegistry;

pub fn run_resolve(
    registry: &mut ResolverRegistry,
    resolver: &str,
    reference: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match registry.resolve(resolver, reference)? {
        Some(path) => println!("{}", path.display()),
        None => eprintln!("No module provides {reference}"),
    }
    Ok(())
}

pub fn run_route(
    registry: &mut ResolverRegistry,
    resolver: &str,
    request: &str,
    ext: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(found) = registry.resolve_route(resolver, request, ext)? else {
        eprintln!("No route matches {request}");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }

    println!("Path:      {}", found.path.display());
    println!("Module:    {}", found.module);
    println!("Route:     {}", found.route);
    println!(
        "Extension: {}",
        found
            .ext
            .map(|ext| ext.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    );
    println!("Depth:     {}", found.depth);
    if !found.remainder.is_empty() {
        println!("Remainder: {}", found.remainder.join("/"));
    }
    Ok(())
}
