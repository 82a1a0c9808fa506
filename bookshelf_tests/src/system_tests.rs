use std::time::UNIX_EPOCH;

use bookshelf_library::api::{BookDetails, ReadingStatus};
use bookshelf_library::client::BookshelfLibraryClient;
use bookshelf_recommendations::client::BookshelfRecommendationsClient;

const LIBRARY_URL: &str = "http://127.0.0.1:8080";
const RECOMMENDATIONS_URL: &str = "http://127.0.0.1:8081";

fn unique_suffix() -> u128 {
    std::time::SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

fn book_details(catalog_id: String, title: &str, authors: &str, description: &str) -> BookDetails {
    BookDetails {
        catalog_id,
        title: title.to_string(),
        authors: authors.to_string(),
        description: Some(description.to_string()),
        cover_url: None,
    }
}

#[tokio::test]
/// Simple test for bookshelf library
/// Adds a book, adding it again returns the same id
/// Puts the book on a shelf, moves and rates it
/// Checks shelves and removes the book
async fn bookshelf_library_e2e_test() {
    let client = BookshelfLibraryClient::new(LIBRARY_URL).expect("Failed to create client");
    let suffix = unique_suffix();
    let user_id = (suffix % 1_000_000) as i32;

    let details = book_details(
        format!("e2e-{suffix}"),
        "The Left Hand of Darkness",
        "Ursula K. Le Guin",
        "An envoy on the winter planet Gethen",
    );
    let book_id = client
        .add_book(details.clone())
        .await
        .expect("Failed to add book");
    assert_eq!(
        client.add_book(details).await.expect("Failed to add book"),
        book_id
    );

    let book = client
        .get_book(book_id)
        .await
        .expect("Failed to get book")
        .expect("Book not found");
    assert_eq!(book.title, "The Left Hand of Darkness");

    assert!(client
        .add_to_shelf(user_id, book_id, ReadingStatus::WantToRead)
        .await
        .expect("Failed to add to shelf"));
    assert!(!client
        .add_to_shelf(user_id, book_id, ReadingStatus::WantToRead)
        .await
        .expect("Failed to add to shelf"));

    client
        .move_book(user_id, book_id, ReadingStatus::Read)
        .await
        .expect("Failed to move book");
    client
        .rate_book(user_id, book_id, 4)
        .await
        .expect("Failed to rate book");
    assert!(client.rate_book(user_id, book_id, 6).await.is_err());

    let shelves = client.shelves(user_id).await.expect("Failed to get shelves");
    assert_eq!(shelves.read.len(), 1);
    assert_eq!(shelves.read[0].rating, Some(4));

    assert!(client
        .remove_book(user_id, book_id)
        .await
        .expect("Failed to remove book"));
    assert!(!client
        .remove_book(user_id, book_id)
        .await
        .expect("Failed to remove book"));
}

#[tokio::test]
/// Rates a book and expects a similar unheld book among recommendations
async fn bookshelf_recommendations_e2e_test() {
    let library_client =
        BookshelfLibraryClient::new(LIBRARY_URL).expect("Failed to create library client");
    let recommendations_client = BookshelfRecommendationsClient::new(RECOMMENDATIONS_URL)
        .expect("Failed to create recommendations client");
    let suffix = unique_suffix();
    let user_id = (suffix % 1_000_000) as i32 + 1_000_000;
    let marker = format!("zorblax{suffix}");

    let rated_id = library_client
        .add_book(book_details(
            format!("rated-{suffix}"),
            &format!("{marker} chronicles"),
            "Ima Writer",
            &format!("The {marker} saga begins"),
        ))
        .await
        .expect("Failed to add book");
    let similar_id = library_client
        .add_book(book_details(
            format!("similar-{suffix}"),
            &format!("{marker} returns"),
            "Ima Writer",
            &format!("The {marker} saga continues"),
        ))
        .await
        .expect("Failed to add book");

    assert!(recommendations_client
        .recommendations_for_user(user_id, None)
        .await
        .expect("Failed to get recommendations")
        .is_empty());

    library_client
        .add_to_shelf(user_id, rated_id, ReadingStatus::Read)
        .await
        .expect("Failed to add to shelf");
    library_client
        .rate_book(user_id, rated_id, 5)
        .await
        .expect("Failed to rate book");

    let recommendations = recommendations_client
        .recommendations_for_user(user_id, Some(3))
        .await
        .expect("Failed to get recommendations");

    assert!(recommendations.len() <= 3);
    assert_eq!(recommendations.first().map(|b| b.id), Some(similar_id));
    assert!(recommendations.iter().all(|b| b.id != rated_id));
}
