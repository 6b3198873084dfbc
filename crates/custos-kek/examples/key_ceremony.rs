//! Walks through a three-custodian KEK loading ceremony with reference
//! components.

use custos_kek::KekBundle;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut bundle = KekBundle::new("demo-zmk", 1, 3, "2D617C");

    let submissions = [
        (1, "E38FD6D9EF85A892F2FBFDD083A407AE", "DD1375"),
        (2, "D0085DBFFB3723B926CB7980B9EA6268", "DACAF5"),
        (3, "20295EBC0B80BF5EF7F78C9125686D3B", "DE5AA9"),
    ];

    for (slot, component, check_value) in submissions {
        bundle.add_component(slot, component, check_value)?;
        println!(
            "custodian {slot} loaded ({}/{})",
            bundle.component_count(),
            bundle.expected_components()
        );
    }

    let kek = bundle.merge()?;
    println!("KEK reconstructed, check value {}", kek.check_value());

    Ok(())
}
