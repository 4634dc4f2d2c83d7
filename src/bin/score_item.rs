use closet_score::item::{BrandType, Item, ItemStatus, Material};
use closet_score::scoring::explain_valuation;
use closet_score::utils::log_valuation;
use std::env;
use std::process;
use std::str::FromStr;

fn print_usage() {
    eprintln!("Usage: score-item [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --second-hand, -s   Item was bought used");
    eprintln!("  --brand <b>         eco_sustainable (eco) | standard | fast_fashion (fast)");
    eprintln!("  --material <m>      natural | synthetic | mixed");
    eprintln!("  --wears <n>         Times worn");
    eprintln!("  --status <s>        active | sold | donated | trashed | lost");
    eprintln!("  --price <p>         Purchase price");
}

fn parse_value<T: FromStr>(flag: &str, value: Option<&String>) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("missing value for {flag}"))?;
    value
        .parse()
        .map_err(|_| format!("invalid value for {flag}: {value}"))
}

fn parse_item(args: &[String]) -> Result<Item, String> {
    let mut item = Item::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--second-hand" | "-s" => item.is_second_hand = true,
            "--brand" => item.brand_type = parse_value::<BrandType>(arg, iter.next())?,
            "--material" => item.material = parse_value::<Material>(arg, iter.next())?,
            "--wears" => item.wear_count = parse_value::<u32>(arg, iter.next())?,
            "--status" => item.status = parse_value::<ItemStatus>(arg, iter.next())?,
            "--price" => {
                let price = parse_value::<f64>(arg, iter.next())?;
                if !price.is_finite() || price < 0.0 {
                    return Err(format!("price must be a non-negative number: {price}"));
                }
                item.price = price;
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    Ok(item)
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    let item = match parse_item(&args) {
        Ok(item) => item,
        Err(e) => {
            eprintln!("{e}");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    log_valuation(&item, &explain_valuation(&item));
}
