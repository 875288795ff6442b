use csv::Writer;

use crate::*;

pub fn process_create_dummy_csv(args: &CreateDummyCsv) -> Result<()> {
    let mut wtr = Writer::from_path(&args.csv_path)?;

    wtr.write_record(["address", "amount"])?;

    for _ in 0..args.num_records {
        wtr.write_record(&[Address::random().to_string(), args.amount.to_string()])?;
    }

    wtr.flush()?;
    println!(
        "wrote {} records of {} to {}",
        args.num_records,
        args.amount,
        args.csv_path.display()
    );
    Ok(())
}
