use std::time::Instant;
use wedding_invitation_service::{config::Config, db::connection, state::AppState, Guest};

// Seeds a few guests and shows the guest cache at work.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    println!("Establishing database connection to {}...", config.database_url);
    let pool = connection::establish_connection(&config.database_url).await?;
    println!("✅ Database connection established!");

    let state = AppState::new(config, pool);

    let guests = vec![
        Guest { plus_ones: 1, ..Guest::new("Jane Doe") },
        Guest { dietary_restrictions: Some("vegetarian".to_string()), ..Guest::new("John Smith") },
        Guest::new("Ana Souza"),
    ];

    let mut to_create = Vec::new();
    for guest in guests {
        if state.guests.get_guest_by_name(&guest.name).await?.is_some() {
            println!("Skipping {}, already on the list", guest.name);
        } else {
            to_create.push(guest);
        }
    }

    if !to_create.is_empty() {
        state.guests.bulk_create_guests(&mut to_create).await?;
        println!("✅ Created {} guests", to_create.len());
    }

    let start = Instant::now();
    let all = state.guests.get_all_guests().await?;
    println!("First lookup: {} guests in {:?}", all.len(), start.elapsed());

    let start = Instant::now();
    let all = state.guests.get_all_guests().await?;
    println!("Cached lookup: {} guests in {:?}", all.len(), start.elapsed());

    for guest in &all {
        println!("  - {} (id {}, plus ones {})", guest.name, guest.id, guest.plus_ones);
    }

    Ok(())
}
