//! Document fixtures shared by the unit tests of every pbquery crate.

use crate::tree::MessageTree;

/// `Person{name:"Ann", age:30, pet:[Dog{name:"Rex"}, Dog{name:"Fido"}]}`
pub fn person_document() -> MessageTree {
    let mut doc = MessageTree::new("Person");
    let root = doc.root_id();
    // The fixture is static; any failure here is a bug in the builder.
    doc.set_scalar(root, "name", "Ann").unwrap();
    doc.set_scalar(root, "age", 30).unwrap();
    for name in ["Rex", "Fido"] {
        let dog = doc.push_message(root, "pet", "Dog").unwrap();
        doc.set_scalar(dog, "name", name).unwrap();
    }
    doc
}

/// A deeper document for descendant and `//` tests:
///
/// ```text
/// Household {
///   name: "Maple St"
///   address: Address { city: "Springfield", zip: "12345" }
///   member: [
///     Person { name: "Ann", age: 30, pet: [Dog { name: "Rex", age: 3 }, Dog { name: "Fido", age: 5 }] }
///     Person { name: "Bob", age: 42, car: Car { make: "Saab", note: Note { text: "old" } } }
///   ]
///   tag: ["cozy", "quiet"]
/// }
/// ```
pub fn household_document() -> MessageTree {
    let mut doc = MessageTree::new("Household");
    let root = doc.root_id();
    doc.set_scalar(root, "name", "Maple St").unwrap();

    let address = doc.set_message(root, "address", "Address").unwrap();
    doc.set_scalar(address, "city", "Springfield").unwrap();
    doc.set_scalar(address, "zip", "12345").unwrap();

    let ann = doc.push_message(root, "member", "Person").unwrap();
    doc.set_scalar(ann, "name", "Ann").unwrap();
    doc.set_scalar(ann, "age", 30).unwrap();
    for (name, age) in [("Rex", 3), ("Fido", 5)] {
        let dog = doc.push_message(ann, "pet", "Dog").unwrap();
        doc.set_scalar(dog, "name", name).unwrap();
        doc.set_scalar(dog, "age", age).unwrap();
    }

    let bob = doc.push_message(root, "member", "Person").unwrap();
    doc.set_scalar(bob, "name", "Bob").unwrap();
    doc.set_scalar(bob, "age", 42).unwrap();
    let car = doc.set_message(bob, "car", "Car").unwrap();
    doc.set_scalar(car, "make", "Saab").unwrap();
    let note = doc.set_message(car, "note", "Note").unwrap();
    doc.set_scalar(note, "text", "old").unwrap();

    doc.push_scalar(root, "tag", "cozy").unwrap();
    doc.push_scalar(root, "tag", "quiet").unwrap();
    doc
}
